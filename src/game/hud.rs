// DOM overlays for level / score / coins / timer / strikes, plus a centred
// banner for countdown and feedback text.
use wasm_bindgen::prelude::*;
use web_sys::{Document, window};

use crate::run::HudView;

const PANEL_STYLE: &str = "position:fixed; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45; letter-spacing:0.5px;";

const OVERLAYS: [(&str, &str); 5] = [
    ("hf-level", "top:10px; left:12px;"),
    ("hf-score", "top:10px; right:12px;"),
    ("hf-coins", "top:44px; right:12px;"),
    ("hf-timer", "top:44px; left:12px;"),
    ("hf-strikes", "top:78px; left:12px;"),
];

const BANNER_ID: &str = "hf-banner";

pub fn ensure_overlays() -> Result<(), JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    for (id, pos) in OVERLAYS {
        ensure(&doc, id, &format!("{PANEL_STYLE} {pos}"))?;
    }
    ensure(
        &doc,
        BANNER_ID,
        "position:fixed; top:40%; left:50%; transform:translate(-50%,-50%); font-family:'Fira Code', monospace; font-size:42px; color:#fff; text-shadow:0 0 6px #000; z-index:60; pointer-events:none;",
    )
}

fn ensure(doc: &Document, id: &str, style: &str) -> Result<(), JsValue> {
    if doc.get_element_by_id(id).is_some() {
        return Ok(());
    }
    let Some(body) = doc.body() else {
        return Ok(());
    };
    let div = doc.create_element("div")?;
    div.set_id(id);
    div.set_attribute("style", style)?;
    body.append_child(&div)?;
    Ok(())
}

fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn render(hud: &HudView) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    set_text(&doc, "hf-level", &format!("LEVEL {}", hud.level));
    set_text(&doc, "hf-score", &format!("SCORE: {}", hud.score));
    set_text(&doc, "hf-coins", &format!("COINS: {}", hud.coins));
    set_text(&doc, "hf-timer", &format!("TIME: {}s", hud.remaining_seconds));

    let hearts: String = (0..hud.max_strikes)
        .map(|i| if i < hud.max_strikes - hud.strikes.min(hud.max_strikes) { '♥' } else { '♡' })
        .collect();
    set_text(&doc, "hf-strikes", &hearts);

    let banner = match (hud.phase, hud.countdown) {
        ("intro", Some(n)) => n.to_string(),
        ("paused", _) => String::from("FOUND ONE!"),
        ("over", _) => String::from("GAME OVER"),
        _ => String::new(),
    };
    set_text(&doc, BANNER_ID, &banner);
}

/// Short-lived banner text, e.g. after a wrong pick.
pub fn flash(text: &str) {
    if let Some(doc) = window().and_then(|w| w.document()) {
        set_text(&doc, BANNER_ID, text);
    }
}
