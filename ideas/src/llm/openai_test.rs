use serde_json::json;

use super::*;

#[test]
fn parses_first_choice() {
    let body = json!({
        "model": "gpt-4o-mini",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "- beach\n- hiking" }, "finish_reason": "stop" },
            { "index": 1, "message": { "role": "assistant", "content": "ignored" }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
    .to_string();
    let resp = parse_response(&body).unwrap();
    assert_eq!(resp.text, "- beach\n- hiking");
    assert_eq!(resp.model, "gpt-4o-mini");
    assert_eq!(resp.stop, StopReason::Complete);
    assert_eq!(resp.usage, Usage { input_tokens: 10, output_tokens: 5 });
}

#[test]
fn length_finish_is_truncated() {
    let body = json!({ "model": "m", "choices": [{ "message": { "content": "cut" }, "finish_reason": "length" }] });
    let resp = parse_response(&body.to_string()).unwrap();
    assert!(resp.truncated());
    assert_eq!(resp.usage, Usage::default());
}

#[test]
fn null_content_is_empty_text() {
    let body = json!({ "choices": [{ "message": { "content": null }, "finish_reason": "stop" }] });
    assert_eq!(parse_response(&body.to_string()).unwrap().text, "");
}

#[test]
fn no_choices_is_parse_error() {
    let body = json!({ "model": "m", "choices": [] }).to_string();
    assert!(matches!(parse_response(&body), Err(LlmError::ApiParse(_))));
    assert!(matches!(parse_response("{"), Err(LlmError::ApiParse(_))));
}

#[test]
fn system_prompt_leads_the_conversation() {
    let messages = [Message::user("first"), Message::assistant(""), Message::assistant("second")];
    let out = wire_messages("be brief", &messages);
    assert_eq!(
        out,
        vec![
            WireMessage { role: "system", content: "be brief" },
            WireMessage { role: "user", content: "first" },
            WireMessage { role: "assistant", content: "second" },
        ]
    );
}

#[test]
fn blank_system_prompt_is_dropped() {
    let messages = [Message::user("x")];
    let out = wire_messages("  ", &messages);
    assert_eq!(out, vec![WireMessage { role: "user", content: "x" }]);
}
