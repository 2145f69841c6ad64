use async_trait::async_trait;
use datasheet_qa::llm::GeminiClient;
use datasheet_qa::*;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn datasheet_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

struct MockModel {
    reply: String,
    seen: Mutex<Vec<AnswerRequest>>,
}

impl MockModel {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AnswerService for MockModel {
    async fn ask(&self, request: &AnswerRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

#[tokio::test]
async fn test_rated_power_scenario() {
    let model = MockModel::new("The motor is rated at 5 kW.");
    let mut session = Session::new(PdfTextExtractor::new(), &model);

    let upload = UploadedDocument::from_bytes("motor.pdf", datasheet_pdf(&["Rated Power: 5kW"]));
    session.on_file_uploaded(upload).unwrap();

    let answer = session.on_submit("what is the rated power?").await.unwrap();
    assert_eq!(answer, "The motor is rated at 5 kW.");

    let seen = model.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].content.contains("rated power: 5kw"));
    assert!(seen[0].content.ends_with("|| USER_QUERY: what is the rated power?"));
    assert_eq!(seen[0].instruction, PERSONA_INSTRUCTION);
}

#[tokio::test]
async fn test_multi_page_datasheet_reaches_model_in_order() {
    let model = MockModel::new("ok");
    let mut session = Session::new(PdfTextExtractor::new(), &model);

    let pages = ["Model M-200", "Rated Torque: 32 Nm", "Max Speed: 6000 RPM"];
    session
        .on_file_uploaded(UploadedDocument::from_bytes("m200.pdf", datasheet_pdf(&pages)))
        .unwrap();
    session.on_submit("Torque AND speed?").await.unwrap();

    let seen = model.seen.lock().unwrap();
    let content = &seen[0].content;
    let model_at = content.find("model m-200").unwrap();
    let torque_at = content.find("rated torque: 32 nm").unwrap();
    let speed_at = content.find("max speed: 6000 rpm").unwrap();
    let query_at = content.find(QUERY_DELIMITER).unwrap();
    assert!(model_at < torque_at && torque_at < speed_at && speed_at < query_at);
    assert!(content.ends_with("torque and speed?"));
}

#[tokio::test]
async fn test_precondition_errors_never_reach_model() {
    let model = MockModel::new("should not be used");
    let mut session = Session::new(PdfTextExtractor::new(), &model);

    assert!(matches!(
        session.on_submit("power?").await,
        Err(DatasheetError::NoDocumentUploaded)
    ));

    let broken = UploadedDocument::from_bytes("scan.pdf", b"%PDF-1.7\n%%EOF".to_vec());
    assert!(matches!(
        session.on_file_uploaded(broken),
        Err(DatasheetError::Extraction { .. })
    ));
    let err = session.on_submit("power?").await.unwrap_err();
    assert!(err.is_precondition());

    assert!(model.seen.lock().unwrap().is_empty());
}

/// Serves exactly one HTTP response and hands back the request line and body it received.
async fn one_shot_server(status: &'static str, body: String) -> (String, oneshot::Receiver<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break raw.len();
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while raw.len() < header_end + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        let request_line = head.lines().next().unwrap_or_default().to_string();
        let request_body = String::from_utf8_lossy(&raw[header_end..]).to_string();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send((request_line, request_body));
    });

    (format!("http://{}/v1beta", addr), rx)
}

fn settings_for(base_url: String) -> Settings {
    Settings::from_lookup(move |key| match key {
        "GOOGLE_API_KEY" => Some("test-key".to_string()),
        "GEMINI_BASE_URL" => Some(base_url.clone()),
        "DATASHEET_QA_MODEL" => Some("gemini-test".to_string()),
        "DATASHEET_QA_TIMEOUT_SECS" => Some("10".to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn test_gemini_round_trip() {
    let reply = serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "Rated power is 5 kW." }] },
            "finishReason": "STOP"
        }]
    })
    .to_string();
    let (base_url, received) = one_shot_server("200 OK", reply).await;

    let client = GeminiClient::new(&settings_for(base_url)).unwrap();
    let mut session = Session::new(PdfTextExtractor::new(), client);
    session
        .on_file_uploaded(UploadedDocument::from_bytes("motor.pdf", datasheet_pdf(&["Rated Power: 5kW"])))
        .unwrap();

    let answer = session.on_submit("What is the rated power?").await.unwrap();
    assert_eq!(answer, "Rated power is 5 kW.");

    let (request_line, body) = received.await.unwrap();
    assert!(request_line.starts_with(
        "POST /v1beta/models/gemini-test:generateContent?key=test-key"
    ));

    let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
    let content = payload["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(content.contains("rated power: 5kw"));
    assert!(content.ends_with("|| USER_QUERY: what is the rated power?"));
    assert_eq!(
        payload["systemInstruction"]["parts"][0]["text"].as_str().unwrap(),
        PERSONA_INSTRUCTION
    );
}

#[tokio::test]
async fn test_gemini_rejected_key() {
    let reply = serde_json::json!({
        "error": {
            "code": 403,
            "message": "Method doesn't allow unregistered callers.",
            "status": "PERMISSION_DENIED"
        }
    })
    .to_string();
    let (base_url, _received) = one_shot_server("403 Forbidden", reply).await;

    let client = GeminiClient::new(&settings_for(base_url)).unwrap();
    let err = client
        .ask(&build_request("Rated Power: 5kW", "power?"))
        .await
        .unwrap_err();

    match err {
        DatasheetError::CredentialRejected { status, details } => {
            assert_eq!(status, 403);
            assert!(details.contains("PERMISSION_DENIED"));
        }
        other => panic!("expected CredentialRejected, got {:?}", other),
    }
}
