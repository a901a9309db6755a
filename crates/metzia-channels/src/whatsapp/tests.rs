use super::qr::generate_qr_terminal;
use super::send::{image_mimetype, split_message, RETRY_DELAYS_MS};
use wacore_binary::jid::{Jid, JidExt};

#[test]
fn test_split_short_message() {
    let chunks = split_message("hello", 4096);
    assert_eq!(chunks, vec!["hello"]);
}

#[test]
fn test_split_long_message() {
    let text = "שורה\n".repeat(1200);
    let chunks = split_message(&text, 4096);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 4096);
    }
}

#[test]
fn test_split_respects_char_boundaries() {
    // Hebrew letters are two bytes each; a naive byte split would panic.
    let text = "א".repeat(5000);
    let chunks = split_message(&text, 4096);
    assert!(chunks.len() >= 2);
    assert_eq!(chunks.concat(), text);
}

#[test]
fn test_jid_group_detection() {
    // Group JIDs use @g.us server.
    let group_jid: Jid = "120363001234567890@g.us".parse().unwrap();
    assert!(group_jid.is_group(), "g.us JID should be detected as group");

    // Personal JIDs use @s.whatsapp.net server.
    let personal_jid: Jid = "972501234567@s.whatsapp.net".parse().unwrap();
    assert!(
        !personal_jid.is_group(),
        "s.whatsapp.net JID should not be group"
    );
}

#[test]
fn test_generate_qr_terminal() {
    let result = generate_qr_terminal("test-data");
    assert!(result.is_ok());
    let qr = result.unwrap();
    assert!(!qr.is_empty());
}

#[test]
fn test_image_mimetype_sniffing() {
    assert_eq!(image_mimetype(&[0x89, b'P', b'N', b'G', 0x0D]), "image/png");
    assert_eq!(image_mimetype(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    assert_eq!(image_mimetype(&[]), "image/jpeg");
}

#[test]
fn test_retry_delays_exponential() {
    assert_eq!(RETRY_DELAYS_MS.len(), 3, "should have 3 retry attempts");
    assert_eq!(RETRY_DELAYS_MS[0], 500, "first delay 500ms");
    // Verify exponential pattern: each delay is 2x the previous.
    assert_eq!(RETRY_DELAYS_MS[1], RETRY_DELAYS_MS[0] * 2);
    assert_eq!(RETRY_DELAYS_MS[2], RETRY_DELAYS_MS[1] * 2);
}
