//! Integration tests for [`pet_bot::AiHandler`] over the crate's real prompt, card and
//! API document, with a recording Bot, canned REST responses and a scripted planner.
//!
//! Covers: card on 2xx, reason text on non-2xx, Say commands, unknown actions, error
//! fallback, prompt rendering, and non-text messages.

mod common;

use std::sync::Arc;

use common::{app_context, get_pet, pet_json, text_message, CannedInvoker, RecordingBot, ScriptedPlanner, Sent};
use dbot_core::{Handler, HandlerResponse};
use llm_client::PlanCommand;
use pet_bot::{AiHandler, ERROR_REPLY};
use prompt::MessageRole;
use serde_json::json;

/// **Test: getPetById with a 200 response sends the rendered pet card.**
///
/// **Setup:** Planner plans getPetById(petId=1); invoker answers 200 with a pet.
/// **Action:** `handler.handle("show me pet 1")`.
/// **Expected:** One card whose title is the pet name and whose facts hold id and status;
/// the invoker saw petId=1.
#[tokio::test]
async fn test_pet_card_sent_on_success() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::new(vec![get_pet(json!(1))]));
    let invoker = Arc::new(CannedInvoker::new(200, "OK", &pet_json().to_string()));
    let handler = AiHandler::new(app_context(bot.clone(), planner.clone(), invoker.clone()));

    let response = handler.handle(&text_message("show me pet 1")).await.unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    let sent = bot.sent();
    assert_eq!(sent.len(), 1);
    let Sent::Card(chat_id, card) = &sent[0] else {
        panic!("expected a card, got {:?}", sent[0]);
    };
    assert_eq!(*chat_id, 456);
    assert_eq!(card["type"], "AdaptiveCard");
    assert_eq!(card["body"][0]["text"], "Rex");
    assert_eq!(card["body"][1]["facts"][0]["value"], 1);
    assert_eq!(card["body"][1]["facts"][1]["value"], "Dogs");
    assert_eq!(card["body"][1]["facts"][2]["value"], "available");
    assert_eq!(card["body"][2]["url"], "https://img.example/rex.png");
    assert_eq!(card["body"][3]["text"], "Tag: friendly");

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "getPetById");
    assert_eq!(calls[0].1.path["petId"], 1);
    assert_eq!(calls[0].1.body, None);
}

/// **Test: A non-2xx response sends its reason phrase instead of a card.**
#[tokio::test]
async fn test_reason_sent_on_not_found() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::new(vec![get_pet(json!(999))]));
    let invoker = Arc::new(CannedInvoker::new(404, "Not Found", "Pet not found"));
    let handler = AiHandler::new(app_context(bot.clone(), planner, invoker));

    handler.handle(&text_message("show me pet 999")).await.unwrap();

    assert_eq!(bot.sent(), vec![Sent::Text(456, "Not Found".to_string())]);
}

/// **Test: A 2xx body that is not JSON fails the turn with the error reply.**
#[tokio::test]
async fn test_non_json_success_body_falls_back() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::new(vec![get_pet(json!(1))]));
    let invoker = Arc::new(CannedInvoker::new(200, "OK", "<html>maintenance</html>"));
    let handler = AiHandler::new(app_context(bot.clone(), planner, invoker));

    handler.handle(&text_message("pet 1")).await.unwrap();

    assert_eq!(bot.sent(), vec![Sent::Text(456, ERROR_REPLY.to_string())]);
}

/// **Test: Say and DoAction commands run in plan order.**
#[tokio::test]
async fn test_plan_commands_run_in_order() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::new(vec![
        PlanCommand::Say("Let me look that up.".to_string()),
        get_pet(json!(1)),
        PlanCommand::Say("Anything else?".to_string()),
    ]));
    let invoker = Arc::new(CannedInvoker::new(200, "OK", &pet_json().to_string()));
    let handler = AiHandler::new(app_context(bot.clone(), planner, invoker));

    handler.handle(&text_message("pet 1 please")).await.unwrap();

    let sent = bot.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0], Sent::Text(456, "Let me look that up.".to_string()));
    assert!(matches!(sent[1], Sent::Card(456, _)));
    assert_eq!(sent[2], Sent::Text(456, "Anything else?".to_string()));
}

/// **Test: An action the registry does not know is reported to the user, not run.**
#[tokio::test]
async fn test_unknown_action_reported() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::new(vec![PlanCommand::DoAction {
        action: "adoptPet".to_string(),
        parameters: json!({}),
    }]));
    let invoker = Arc::new(CannedInvoker::new(200, "OK", "{}"));
    let handler = AiHandler::new(app_context(bot.clone(), planner, invoker.clone()));

    handler.handle(&text_message("adopt Rex")).await.unwrap();

    assert!(invoker.calls().is_empty());
    assert_eq!(
        bot.sent(),
        vec![Sent::Text(456, "Sorry, I don't know how to do \"adoptPet\".".to_string())]
    );
}

/// **Test: Planner failure and transport failure both end in the error reply.**
#[tokio::test]
async fn test_errors_send_error_reply() {
    let bot = Arc::new(RecordingBot::default());
    let handler = AiHandler::new(app_context(
        bot.clone(),
        Arc::new(ScriptedPlanner::failing()),
        Arc::new(CannedInvoker::new(200, "OK", "{}")),
    ));
    handler.handle(&text_message("hello")).await.unwrap();
    assert_eq!(bot.sent(), vec![Sent::Text(456, ERROR_REPLY.to_string())]);

    let bot = Arc::new(RecordingBot::default());
    let handler = AiHandler::new(app_context(
        bot.clone(),
        Arc::new(ScriptedPlanner::new(vec![get_pet(json!(1))])),
        Arc::new(CannedInvoker::unreachable()),
    ));
    handler.handle(&text_message("pet 1")).await.unwrap();
    assert_eq!(bot.sent(), vec![Sent::Text(456, ERROR_REPLY.to_string())]);
}

/// **Test: Parameters of the wrong shape fail the turn with the error reply.**
#[tokio::test]
async fn test_malformed_parameters_fall_back() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::new(vec![PlanCommand::DoAction {
        action: "getPetById".to_string(),
        parameters: json!({"path": [1]}),
    }]));
    let invoker = Arc::new(CannedInvoker::new(200, "OK", "{}"));
    let handler = AiHandler::new(app_context(bot.clone(), planner, invoker.clone()));

    handler.handle(&text_message("pet 1")).await.unwrap();

    assert!(invoker.calls().is_empty());
    assert_eq!(bot.sent(), vec![Sent::Text(456, ERROR_REPLY.to_string())]);
}

/// **Test: When even the error reply cannot be sent, the handler returns the error.**
#[tokio::test]
async fn test_undeliverable_error_reply_propagates() {
    let handler = AiHandler::new(app_context(
        Arc::new(RecordingBot::failing()),
        Arc::new(ScriptedPlanner::failing()),
        Arc::new(CannedInvoker::new(200, "OK", "{}")),
    ));
    assert!(handler.handle(&text_message("hello")).await.is_err());
}

/// **Test: The planner sees the rendered system prompt, the user text, actions and options.**
///
/// **Setup:** Real prompts/chat folder.
/// **Action:** Handle "show me pet 1".
/// **Expected:** System message contains the raw actions.json text (no `{{getActions}}`
/// left); user message is the input; getPetById offered; config.json options passed.
#[tokio::test]
async fn test_planner_receives_prompt_and_actions() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::new(Vec::new()));
    let invoker = Arc::new(CannedInvoker::new(200, "OK", "{}"));
    let handler = AiHandler::new(app_context(bot.clone(), planner.clone(), invoker));

    handler.handle(&text_message("show me pet 1")).await.unwrap();

    let messages = planner.seen_messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::System);
    assert!(messages[0].content.contains("\"name\": \"getPetById\""));
    assert!(!messages[0].content.contains("{{"));
    assert_eq!(messages[1].role, MessageRole::User);
    assert_eq!(messages[1].content, "show me pet 1");
    assert_eq!(*planner.seen_actions.lock().unwrap(), vec!["getPetById".to_string()]);
    let options = planner.seen_options.lock().unwrap().clone().unwrap();
    assert_eq!(options.max_tokens, Some(1000));
    assert_eq!(options.temperature, Some(0.2));
    assert!(bot.sent().is_empty());
}

/// **Test: Non-text and blank messages are passed on without calling the planner.**
#[tokio::test]
async fn test_non_text_messages_continue() {
    let bot = Arc::new(RecordingBot::default());
    let planner = Arc::new(ScriptedPlanner::failing());
    let invoker = Arc::new(CannedInvoker::new(200, "OK", "{}"));
    let handler = AiHandler::new(app_context(bot.clone(), planner.clone(), invoker));

    let response = handler.handle(&common::members_added_message()).await.unwrap();
    assert_eq!(response, HandlerResponse::Continue);
    let response = handler.handle(&text_message("   ")).await.unwrap();
    assert_eq!(response, HandlerResponse::Continue);

    assert!(planner.seen_messages.lock().unwrap().is_empty());
    assert!(bot.sent().is_empty());
}
