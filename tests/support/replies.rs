use numrot_gateway::port::{HttpReply, HttpRequest, TransportError};

pub fn accepted(number: &str) -> HttpReply {
    HttpReply::new(
        200,
        format!(r#"{{"StatusCode":"200","DocumentNumber":"{number}","TrackId":"{number}","Document":"PHhtbC8+"}}"#),
    )
}

pub fn rejected(number: &str, reason: &str) -> HttpReply {
    HttpReply::new(
        200,
        format!(r#"{{"StatusCode":"400","DocumentNumber":"{number}","ErrorReason":["{reason}"]}}"#),
    )
}

/// `ID` of the submitted payload.
pub fn submitted_number(request: &HttpRequest) -> String {
    request
        .json_body()
        .and_then(|body| body["ID"].as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Route that accepts every submission, echoing its number.
pub fn accept_all(request: &HttpRequest) -> Result<HttpReply, TransportError> {
    Ok(accepted(&submitted_number(request)))
}
