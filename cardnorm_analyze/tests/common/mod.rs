#![allow(dead_code)]

use cardnorm_core::RawRecord;

/// Build a card page whose definition list starts at `anchor`.
pub fn page(anchor: &str, values: &[&str]) -> String {
    let mut html = String::from("<div class=\"cardDetail\">\n<div class=\"cardRarity\">R</div>\n<dl>\n");
    html.push_str(anchor);
    html.push('\n');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            html.push_str(&format!("<dt>col{i}</dt>\n"));
        }
        html.push_str(&format!("<dd>{value}</dd>\n"));
    }
    html.push_str("</dl>\n</div>");
    html
}

pub fn current_page(values: &[&str]) -> String {
    page("<dt>カード種類</dt>", values)
}

pub fn legacy_page(values: &[&str]) -> String {
    page("<dt>種類</dt>", values)
}

pub const SIGNI: [&str; 12] = [
    "シグニ",
    "奏羅：宇宙",
    "青",
    "3",
    "-",
    "《青》×１",
    "-",
    "8000",
    "-",
    "-",
    "",
    "",
];

pub const ARTS: [&str; 12] = [
    "アーツ",
    "-",
    "赤",
    "-",
    "-",
    "《赤》×２《無》×１",
    "-",
    "-",
    "-",
    "【メインフェイズ】【アタックフェイズ】",
    "<img src=\"/wp-content/images/icon_txt_format_key.png\">",
    "",
];

pub fn signi_record(card_number: &str, name: &str) -> RawRecord {
    RawRecord::new(0, card_number, name, &current_page(&SIGNI))
        .with_skill_text("【自】：このシグニがアタックしたとき、カードを１枚引く。")
        .with_life_burst_text("対戦相手のシグニ１体をバニッシュする。")
}
