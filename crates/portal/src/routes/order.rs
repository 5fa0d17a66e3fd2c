//! Assistant ("Fazer Pedido") page handlers.
//!
//! The chat transcript lives in the session; each prompt is sent to the LLM
//! with the knowledge base folded into the system prompt, and the streamed
//! fragments come back as one concatenated reply.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{ChatMessage, session_keys};
use crate::pages::{NavLink, Page, nav_links};
use crate::state::AppState;

/// Persona instructions the system prompt always carries.
const SYSTEM_PERSONA: &str = "Você é o assistente de pedidos da Flash Pagamentos. \
    Responda em português, de forma curta e cordial, usando apenas as informações \
    do catálogo abaixo quando existirem.";

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pedido", get(index))
        .route("/pedido/mensagem", axum::routing::post(send_message))
}

/// Prompt form data.
#[derive(Debug, Deserialize)]
pub struct PromptForm {
    pub prompt: String,
}

/// Assistant page template.
#[derive(Template, WebTemplate)]
#[template(path = "order/index.html")]
pub struct OrderTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
    pub transcript: Vec<ChatMessage>,
    pub error: Option<String>,
}

/// Assistant page handler.
///
/// GET /pedido
async fn index(
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    Page::Order.authorize(user.role)?;

    let transcript = load_transcript(&session).await?;

    Ok(OrderTemplate {
        nav: nav_links(user.role, Page::Order),
        user_name: user.name,
        transcript,
        error: None,
    })
}

/// Prompt submission handler.
///
/// POST /pedido/mensagem
async fn send_message(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PromptForm>,
) -> Result<Response, AppError> {
    Page::Order.authorize(user.role)?;

    let prompt = form.prompt.trim().to_string();
    if prompt.is_empty() {
        return Ok(Redirect::to("/pedido").into_response());
    }

    let mut transcript = load_transcript(&session).await?;

    // Registration intent is answered locally, without the model.
    if wants_registration(&prompt) {
        push_exchange(
            &mut transcript,
            prompt,
            "Claro! Para se cadastrar, acesse a página de cadastro em /auth/register \
             e preencha seus dados. Depois é só fazer login e pedir por aqui."
                .to_string(),
        );
        save_transcript(&session, &transcript).await?;
        return Ok(Redirect::to("/pedido").into_response());
    }

    let Some(llm) = state.llm() else {
        return Ok(render_with_error(
            user.role,
            user.name,
            transcript,
            "O assistente está indisponível no momento (nenhum token de API configurado).",
        ));
    };

    let system_prompt = build_system_prompt(state.knowledge());

    match llm.generate(Some(system_prompt), prompt.clone()).await {
        Ok(reply) => {
            push_exchange(&mut transcript, prompt, reply);
            save_transcript(&session, &transcript).await?;
            Ok(Redirect::to("/pedido").into_response())
        }
        Err(e) => {
            tracing::warn!("Assistant call failed: {e}");
            Ok(render_with_error(
                user.role,
                user.name,
                transcript,
                &format!("Erro ao consultar o assistente: {e}"),
            ))
        }
    }
}

fn render_with_error(
    role: flash_pagamentos_core::Role,
    user_name: String,
    transcript: Vec<ChatMessage>,
    message: &str,
) -> Response {
    OrderTemplate {
        nav: nav_links(role, Page::Order),
        user_name,
        transcript,
        error: Some(message.to_string()),
    }
    .into_response()
}

async fn load_transcript(session: &Session) -> Result<Vec<ChatMessage>, AppError> {
    Ok(session
        .get::<Vec<ChatMessage>>(session_keys::CHAT_TRANSCRIPT)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?
        .unwrap_or_default())
}

async fn save_transcript(
    session: &Session,
    transcript: &[ChatMessage],
) -> Result<(), AppError> {
    session
        .insert(session_keys::CHAT_TRANSCRIPT, transcript)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))
}

fn push_exchange(transcript: &mut Vec<ChatMessage>, prompt: String, reply: String) {
    transcript.push(ChatMessage {
        role: "user".to_string(),
        content: prompt,
    });
    transcript.push(ChatMessage {
        role: "assistant".to_string(),
        content: reply,
    });
}

/// Fold the knowledge base into the system prompt.
fn build_system_prompt(knowledge: &[String]) -> String {
    if knowledge.is_empty() {
        return SYSTEM_PERSONA.to_string();
    }

    let mut prompt = String::from(SYSTEM_PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(&knowledge.join("\n\n"));
    prompt
}

/// Does the prompt ask to create an account?
///
/// Keyword list carried over from the production assistant.
fn wants_registration(prompt: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "cadastrar",
        "cadastro",
        "inscrição",
        "inscrever",
        "registrar",
        "me registrar",
    ];

    let lowered = prompt.to_lowercase();
    KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_intent_is_detected() {
        assert!(wants_registration("Quero me cadastrar"));
        assert!(wants_registration("gostaria de fazer minha INSCRIÇÃO"));
        assert!(wants_registration("desejo me registrar no sistema"));
        assert!(!wants_registration("quero um quilo de picanha"));
        assert!(!wants_registration("qual o valor da entrega?"));
    }

    #[test]
    fn system_prompt_includes_knowledge() {
        let knowledge = vec!["cardápio".to_string(), "preços".to_string()];
        let prompt = build_system_prompt(&knowledge);
        assert!(prompt.starts_with(SYSTEM_PERSONA));
        assert!(prompt.contains("cardápio"));
        assert!(prompt.contains("preços"));

        assert_eq!(build_system_prompt(&[]), SYSTEM_PERSONA);
    }

    #[test]
    fn exchange_appends_user_then_assistant() {
        let mut transcript = Vec::new();
        push_exchange(&mut transcript, "oi".to_string(), "olá!".to_string());
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, "user");
        assert_eq!(transcript[1].role, "assistant");
    }
}
