use super::replies::SEARCH_FAILED_REPLY;
use super::trigger::match_trigger;
use super::*;
use async_trait::async_trait;
use metzia_core::{config::SearchConfig, error::MetziaError, product::Product};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// What a test channel saw, in order.
#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Text(String),
    Image { target: String },
}

/// Channel that records every outgoing message.
#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingChannel {
    async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "test"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, MetziaError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), MetziaError> {
        self.sent.lock().await.push(Sent::Text(message.text));
        Ok(())
    }

    async fn send_image(
        &self,
        target: &str,
        _image: &[u8],
        _caption: &str,
    ) -> Result<(), MetziaError> {
        self.sent.lock().await.push(Sent::Image {
            target: target.to_string(),
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), MetziaError> {
        Ok(())
    }
}

/// Product source returning a fixed list, counting invocations.
struct FixedSource {
    products: Vec<Product>,
    searches: AtomicUsize,
}

impl FixedSource {
    fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            searches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProductSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn search(&self, _keyword: &str) -> Result<Vec<Product>, MetziaError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.clone())
    }
}

/// Product source that always fails.
struct FailingSource;

#[async_trait]
impl ProductSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _keyword: &str) -> Result<Vec<Product>, MetziaError> {
        Err(MetziaError::Search("backend down".into()))
    }
}

fn product(title: &str, image: Option<&str>) -> Product {
    Product {
        title: title.to_string(),
        image: image.map(str::to_string),
        rating: Some("4.7".to_string()),
        price: Some("₪59.90".to_string()),
        url: format!("https://aliexpress.com/item/{title}"),
    }
}

fn test_dispatcher(source: Arc<dyn ProductSource>) -> (Arc<Dispatcher>, Arc<RecordingChannel>) {
    let recorder = Arc::new(RecordingChannel::default());
    let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
    let channel: Arc<dyn Channel> = recorder.clone();
    channels.insert("test".to_string(), channel);
    // Default config has no affiliate endpoint, so resolution is offline.
    let resolver = AffiliateResolver::new(SearchConfig::default());
    (
        Arc::new(Dispatcher::new(source, resolver, channels)),
        recorder,
    )
}

fn incoming(text: &str) -> IncomingMessage {
    IncomingMessage {
        id: Uuid::new_v4(),
        channel: "test".to_string(),
        sender_id: "972501234567".to_string(),
        sender_name: Some("בודק".to_string()),
        text: text.to_string(),
        timestamp: chrono::Utc::now(),
        reply_target: Some("972501234567@s.whatsapp.net".to_string()),
        is_group: false,
    }
}

fn texts(sent: &[Sent]) -> Vec<&str> {
    sent.iter()
        .filter_map(|s| match s {
            Sent::Text(t) => Some(t.as_str()),
            Sent::Image { .. } => None,
        })
        .collect()
}

// --- Trigger matching ---

#[test]
fn test_trigger_article_form() {
    let m = match_trigger("תחפש את המטען").unwrap();
    assert_eq!(m.keyword, "מטען");
}

#[test]
fn test_trigger_article_form_with_li() {
    let m = match_trigger("תחפש לי את הכיסוי לטלפון").unwrap();
    assert_eq!(m.keyword, "כיסוי לטלפון");
}

#[test]
fn test_trigger_bare_form() {
    let m = match_trigger("תחפש מטען נייד").unwrap();
    assert_eq!(m.keyword, "מטען נייד");
}

#[test]
fn test_trigger_bare_form_with_li() {
    let m = match_trigger("תחפש לי אוזניות").unwrap();
    assert_eq!(m.keyword, "אוזניות");
}

#[test]
fn test_trigger_keyword_is_trimmed() {
    let m = match_trigger("תחפש לי את המקלדת   ").unwrap();
    assert_eq!(m.keyword, "מקלדת");
}

#[test]
fn test_trigger_requires_the_phrase_prefix() {
    assert!(match_trigger("בוקר טוב").is_none());
    assert!(match_trigger("אולי תחפש מטען").is_none(), "trigger must anchor at the start");
    assert!(match_trigger("").is_none());
}

#[test]
fn test_trigger_without_keyword_is_no_match() {
    assert!(match_trigger("תחפש").is_none());
    assert!(match_trigger("תחפש לי").is_none());
}

// --- Dispatch pipeline ---

#[tokio::test]
async fn test_non_trigger_has_no_side_effects() {
    let source = Arc::new(FixedSource::new(vec![product("מטען דגם A", None)]));
    let (dispatcher, recorder) = test_dispatcher(source.clone());

    dispatcher.dispatch_message(incoming("מה שלומך?")).await;

    assert_eq!(source.searches.load(Ordering::SeqCst), 0, "no search call");
    assert!(recorder.sent().await.is_empty(), "no replies sent");
}

#[tokio::test]
async fn test_search_failure_sends_exactly_one_failure_reply() {
    let (dispatcher, recorder) = test_dispatcher(Arc::new(FailingSource));

    dispatcher.dispatch_message(incoming("תחפש מטען")).await;

    let sent = recorder.sent().await;
    let texts = texts(&sent);
    assert_eq!(texts.len(), 2, "ack plus one failure reply: {texts:?}");
    assert!(texts[0].contains("מחפש לך"), "first reply should be the ack");
    assert!(texts[0].contains("מטען"), "ack should echo the keyword");
    assert_eq!(texts[1], SEARCH_FAILED_REPLY);
    assert!(
        !sent.iter().any(|s| matches!(s, Sent::Image { .. })),
        "no product replies after a failed search"
    );
}

#[tokio::test]
async fn test_presents_at_most_three_products_in_order() {
    let products = (1..=5)
        .map(|i| product(&format!("מוצר {i}"), None))
        .collect();
    let (dispatcher, recorder) = test_dispatcher(Arc::new(FixedSource::new(products)));

    dispatcher.dispatch_message(incoming("תחפש לי את המוצר")).await;

    let sent = recorder.sent().await;
    let texts = texts(&sent);
    assert_eq!(texts.len(), 4, "ack plus three captions: {texts:?}");
    for (caption, i) in texts[1..].iter().zip(1..) {
        assert!(
            caption.contains(&format!("מוצר {i}")),
            "caption {i} out of order: {caption}"
        );
    }
    assert!(
        !texts.iter().any(|t| t.contains("מוצר 4") || t.contains("מוצר 5")),
        "results past the third must not be presented"
    );
}

#[tokio::test]
async fn test_product_without_image_gets_caption_only() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/b.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(vec![0x89, b'P', b'N', b'G'])
        .create_async()
        .await;

    let image_url = format!("{}/b.png", server.url());
    let products = vec![
        product("מוצר בלי תמונה", None),
        product("מוצר עם תמונה", Some(&image_url)),
    ];
    let (dispatcher, recorder) = test_dispatcher(Arc::new(FixedSource::new(products)));

    dispatcher.dispatch_message(incoming("תחפש מוצר")).await;

    let sent = recorder.sent().await;
    assert_eq!(sent.len(), 4, "ack, caption, image, caption: {sent:?}");
    assert!(matches!(&sent[1], Sent::Text(t) if t.contains("מוצר בלי תמונה")));
    assert!(
        matches!(&sent[2], Sent::Image { target } if target == "972501234567@s.whatsapp.net"),
        "second product should lead with its image"
    );
    assert!(matches!(&sent[3], Sent::Text(t) if t.contains("מוצר עם תמונה")));
}

#[tokio::test]
async fn test_failed_image_fetch_still_sends_caption() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/gone.png")
        .with_status(404)
        .create_async()
        .await;

    let image_url = format!("{}/gone.png", server.url());
    let products = vec![product("מוצר", Some(&image_url))];
    let (dispatcher, recorder) = test_dispatcher(Arc::new(FixedSource::new(products)));

    dispatcher.dispatch_message(incoming("תחפש מוצר")).await;

    let sent = recorder.sent().await;
    assert_eq!(sent.len(), 2, "ack plus caption, image silently skipped");
    assert!(matches!(&sent[1], Sent::Text(t) if t.contains("מוצר")));
}

#[tokio::test]
async fn test_sequential_triggers_leave_chat_idle() {
    let source = Arc::new(FixedSource::new(vec![product("מטען דגם A", None)]));
    let (dispatcher, recorder) = test_dispatcher(source.clone());

    dispatcher
        .clone()
        .dispatch_message(incoming("תחפש מטען"))
        .await;
    dispatcher
        .clone()
        .dispatch_message(incoming("תחפש לי את המטען"))
        .await;

    assert_eq!(source.searches.load(Ordering::SeqCst), 2);
    assert_eq!(texts(&recorder.sent().await).len(), 4, "two acks, two captions");
    assert!(
        dispatcher.active_chats.lock().await.is_empty(),
        "chat should not stay marked active"
    );
}
