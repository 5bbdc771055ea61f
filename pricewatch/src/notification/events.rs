//! Price alert payload and the text rendered from it.

use serde::Serialize;

use crate::domain::{MonitoredItem, PriceChange, PriceDirection};

/// Maximum product name length in chat messages.
pub const CHAT_NAME_LIMIT: usize = 100;

/// One detected price change for one item, addressed to its owner.
#[derive(Debug, Clone, Serialize)]
pub struct PriceAlert {
    pub user_id: String,
    pub item_id: String,
    pub item_name: String,
    pub item_url: String,
    pub image_url: Option<String>,
    pub direction: PriceDirection,
    pub old_price: f64,
    pub new_price: f64,
}

impl PriceAlert {
    pub fn new(item: &MonitoredItem, change: PriceChange) -> Self {
        Self {
            user_id: item.user_id.clone(),
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            item_url: item.url.clone(),
            image_url: item.image_url.clone(),
            direction: change.direction,
            old_price: change.old_price,
            new_price: change.new_price,
        }
    }

    /// Use the display fields of the fetch that detected the change. A
    /// missing image keeps the stored one.
    pub fn with_display(mut self, name: &str, image_url: Option<&str>) -> Self {
        self.item_name = name.to_string();
        if let Some(src) = image_url {
            self.image_url = Some(src.to_string());
        }
        self
    }

    fn change(&self) -> PriceChange {
        PriceChange {
            direction: self.direction,
            old_price: self.old_price,
            new_price: self.new_price,
        }
    }

    /// Savings for a drop, increase amount for a rise.
    pub fn amount(&self) -> f64 {
        self.change().amount()
    }

    pub fn percent(&self) -> f64 {
        self.change().percent()
    }

    /// Feed entry kind.
    pub fn kind(&self) -> &'static str {
        match self.direction {
            PriceDirection::Drop => "PRICE_DROP",
            PriceDirection::Increase => "PRICE_INCREASE",
        }
    }

    pub fn title(&self) -> String {
        match self.direction {
            PriceDirection::Drop => format!("Price dropped {:.0}%", self.percent()),
            PriceDirection::Increase => format!("Price went up {:.0}%", self.percent()),
        }
    }

    /// Plain-text body for the in-app feed.
    pub fn message(&self) -> String {
        match self.direction {
            PriceDirection::Drop => format!(
                "{} dropped from R$ {:.2} to R$ {:.2}. You save R$ {:.2}.",
                self.item_name,
                self.old_price,
                self.new_price,
                self.amount()
            ),
            PriceDirection::Increase => format!(
                "{} went up from R$ {:.2} to R$ {:.2} (+R$ {:.2}).",
                self.item_name,
                self.old_price,
                self.new_price,
                self.amount()
            ),
        }
    }

    pub fn email_subject(&self) -> String {
        match self.direction {
            PriceDirection::Drop => format!(
                "Price drop: {} - save R$ {:.2} ({:.0}% off)",
                self.item_name,
                self.amount(),
                self.percent()
            ),
            PriceDirection::Increase => format!(
                "Price increase: {} - up R$ {:.2} ({:.0}%)",
                self.item_name,
                self.amount(),
                self.percent()
            ),
        }
    }

    /// Minimal HTML body for the email channel.
    pub fn email_html(&self) -> String {
        let name = escape_html(&self.item_name);
        let url = escape_html(&self.item_url);
        let image = self
            .image_url
            .as_deref()
            .map(|src| format!(r#"<p><img src="{}" alt="" width="160"></p>"#, escape_html(src)))
            .unwrap_or_default();
        format!(
            "<h2>{}</h2>{}<p><strong>{}</strong></p>\
             <p>Before: R$ {:.2}<br>Now: <strong>R$ {:.2}</strong></p>\
             <p><a href=\"{}\">View product</a></p>",
            escape_html(&self.title()),
            image,
            name,
            self.old_price,
            self.new_price,
            url
        )
    }

    /// Telegram Markdown message.
    pub fn chat_markdown(&self) -> String {
        let name = truncate_chars(&self.item_name, CHAT_NAME_LIMIT);
        match self.direction {
            PriceDirection::Drop => format!(
                "{} *PRICE DROPPED {:.0}%!*\n\n\u{1f4e6} *{}*\n\n\
                 \u{1f4b5} Was: ~R$ {:.2}~\n\u{2705} Now: *R$ {:.2}*\n\
                 \u{1f4b0} You save: *R$ {:.2}*\n\n[\u{1f6d2} View product]({})",
                drop_marker(self.percent()),
                self.percent(),
                name,
                self.old_price,
                self.new_price,
                self.amount(),
                self.item_url
            ),
            PriceDirection::Increase => format!(
                "\u{1f4c8} *PRICE WENT UP {:.0}%*\n\n\u{1f4e6} *{}*\n\n\
                 \u{1f4b5} Was: R$ {:.2}\n\u{2b06}\u{fe0f} Now: *R$ {:.2}*\n\
                 \u{1f4ca} Increase: R$ {:.2}\n\n[\u{1f50d} View product]({})",
                self.percent(),
                name,
                self.old_price,
                self.new_price,
                self.amount(),
                self.item_url
            ),
        }
    }
}

/// Intensity marker for drops: 20% and up, 10% and up, anything else.
pub fn drop_marker(percent: f64) -> &'static str {
    if percent >= 20.0 {
        "\u{1f525}\u{1f525}\u{1f525}"
    } else if percent >= 10.0 {
        "\u{26a1}\u{26a1}"
    } else {
        "\u{1f4b0}"
    }
}

/// Truncate to `max` characters, ending with `...` when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
