//! Webhook handlers for chat and presence events relayed by the XMPP
//! gateway, and the guru's canned replies.

use super::web_handlers::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ChatMessage, PresenceUpdate, Question};
use crate::xmpp::{bare_jid, ParsedBody};
use actix_web::{web, HttpRequest, HttpResponse, Result};

pub const PONDER_MSG: &str = "Hmm. Let me think on that a bit.";

pub const SOMEONE_ANSWERED_MSG: &str = "We seek those who are wise and fast. One out of two is \
                                        not enough. Another has answered my question.";

pub const WAIT_MSG: &str = "Please! One question at a time! You can ask me another once you have \
                            an answer to your current question.";

pub const THANKS_MSG: &str = "Thank you for your wisdom.";

pub const TELLME_THANKS_MSG: &str =
    "Thank you for your wisdom. I'm still thinking about your question.";

pub const EMPTYQ_MSG: &str = "Sorry, I don't have anything to ask you at the moment.";

pub fn tellme_msg(question: &str) -> String {
    format!("While I'm thinking, perhaps you can answer me this: {question}")
}

pub fn answer_intro_msg(question: &str) -> String {
    format!("You asked me: {question}")
}

pub fn answer_msg(answer: &str) -> String {
    format!("I have thought long and hard, and concluded: {answer}")
}

pub fn help_msg(base_url: &str) -> String {
    format!(
        "I am the amazing Crowd Guru. Ask me a question by typing '/tellme the meaning of life', \
         and I will answer you forthwith! To learn more, go to {base_url}/"
    )
}

/// Webhook for chat messages. Always answers 200; replies travel back
/// through the gateway, not the HTTP response.
pub async fn chat_message(
    data: web::Data<AppState>,
    form: web::Form<ChatMessage>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let message = form.into_inner();
    let sender = bare_jid(&message.sender).to_string();
    let parsed = ParsedBody::parse(&message.body);

    tracing::debug!("Chat from {}: command={:?}", sender, parsed.command);

    match parsed.command.as_deref() {
        Some("tellme") => tellme(&data, &sender, &parsed.arg).await?,
        Some("askme") => askme(&data, &sender).await?,
        Some(_) => send_help(&data, &sender, &req).await,
        None => plain_text(&data, &sender, &parsed.arg, &req).await?,
    }

    Ok(HttpResponse::Ok().finish())
}

/// Webhook for presence changes. Going unavailable suspends the sender's
/// pending question; coming back lifts the suspension.
pub async fn presence(
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<PresenceUpdate>,
) -> Result<HttpResponse, AppError> {
    let status = path.into_inner();

    let suspend = match status.as_str() {
        "unavailable" => true,
        "available" => false,
        other => {
            return Err(AppError::NotFound(format!(
                "Unknown presence status: {other}"
            )))
        }
    };

    let sender = bare_jid(&form.sender).to_string();

    if data.database.set_suspended(&sender, suspend)? {
        tracing::info!("Question from {} marked suspended={}", sender, suspend);
    }

    Ok(HttpResponse::Ok().finish())
}

/// `/tellme <question>`: store the question, then try to hand the asker
/// someone else's question in return.
async fn tellme(data: &AppState, sender: &str, arg: &str) -> AppResult<()> {
    if data.database.get_asked(sender)?.is_some() {
        // One outstanding question per asker
        reply(data, sender, WAIT_MSG).await;
        return Ok(());
    }

    let question = Question::new(arg.to_string(), sender.to_string());
    data.database.create_question(&question)?;

    if data.database.get_answering(sender)?.is_none() {
        if let Some(assigned) = data.database.assign_question(sender)? {
            reply(data, sender, &tellme_msg(&assigned.question)).await;
            return Ok(());
        }
    }

    reply(data, sender, PONDER_MSG).await;
    Ok(())
}

/// `/askme`: hand the sender a question to answer.
async fn askme(data: &AppState, sender: &str) -> AppResult<()> {
    let currently_answering = data.database.get_answering(sender)?;

    match data.database.assign_question(sender)? {
        Some(question) => reply(data, sender, &tellme_msg(&question.question)).await,
        None => reply(data, sender, EMPTYQ_MSG).await,
    }

    // Keep the old assignment until the new pick is made
    if let Some(previous) = currently_answering {
        data.database.unassign(previous.id, sender)?;
    }

    Ok(())
}

/// Plain text: an answer if the sender holds an assignment, help otherwise.
async fn plain_text(data: &AppState, sender: &str, arg: &str, req: &HttpRequest) -> AppResult<()> {
    let question = match data.database.get_answering(sender)? {
        Some(question) => question,
        None => {
            send_help(data, sender, req).await;
            return Ok(());
        }
    };

    let other_assignees: Vec<String> = question
        .assignees
        .iter()
        .filter(|assignee| assignee.as_str() != sender)
        .cloned()
        .collect();

    if !data.database.record_answer(question.id, arg, sender)? {
        // Lost the race; the winner already notified everyone
        tracing::debug!(
            "Question {} was answered before {}'s reply landed",
            question.id,
            sender
        );
        return Ok(());
    }

    let asker = vec![question.asker.clone()];
    send_or_log(data, &asker, &answer_intro_msg(&question.question)).await;
    send_or_log(data, &asker, &answer_msg(arg)).await;

    if data.database.get_asked(sender)?.is_some() {
        reply(data, sender, TELLME_THANKS_MSG).await;
    } else {
        reply(data, sender, THANKS_MSG).await;
    }

    if !other_assignees.is_empty() {
        send_or_log(data, &other_assignees, SOMEONE_ANSWERED_MSG).await;
    }

    Ok(())
}

async fn send_help(data: &AppState, sender: &str, req: &HttpRequest) {
    let base_url = {
        let info = req.connection_info();
        format!("{}://{}", info.scheme(), info.host())
    };

    reply(data, sender, &help_msg(&base_url)).await;
}

async fn reply(data: &AppState, user: &str, body: &str) {
    send_or_log(data, &[user.to_string()], body).await;
}

/// Delivery failures are logged and swallowed; the guru never retries.
async fn send_or_log(data: &AppState, recipients: &[String], body: &str) {
    if let Err(e) = data.xmpp.send_message(recipients, body).await {
        tracing::warn!("Chat delivery to {:?} failed: {}", recipients, e);
    }
}
