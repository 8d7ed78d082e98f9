//! CSS selectors for recognising bot walls served with a 2xx status.
//!
//! Update this file when a storefront's protection vendor changes its
//! challenge markup.

use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Interstitial challenge markup. Embedded captcha widgets (recaptcha,
/// hcaptcha) are not listed: storefronts put them in newsletter and login
/// forms on ordinary listing pages.
pub static CHALLENGE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "form[action*='validateCaptcha'], \
         form#challenge-form, \
         #px-captcha, \
         #cf-challenge-running",
    )
    .unwrap()
});

/// Page title, checked against known block phrases.
pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

const BLOCKED_TITLES: [&str; 4] =
    ["access denied", "just a moment", "attention required", "are you a robot"];

/// Returns true if the page is a captcha or bot-protection wall.
pub fn is_blocked(html: &str) -> bool {
    let document = Html::parse_document(html);

    if document.select(&CHALLENGE).next().is_some() {
        return true;
    }

    document.select(&TITLE).next().is_some_and(|t| {
        let title = t.text().collect::<String>().to_lowercase();
        BLOCKED_TITLES.iter().any(|phrase| title.contains(phrase))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_compile() {
        let _ = &*CHALLENGE;
        let _ = &*TITLE;
    }

    #[test]
    fn test_normal_page_not_blocked() {
        let html = r#"<html><head><title>Leggings | Lululemon UK</title></head>
            <body><div class="product-card"><h2>Align Pant</h2></div></body></html>"#;
        assert!(!is_blocked(html));
        assert!(!is_blocked(""));
    }

    #[test]
    fn test_captcha_form_blocked() {
        let html =
            r#"<html><body><form action="/errors/validateCaptcha">CAPTCHA</form></body></html>"#;
        assert!(is_blocked(html));

        let html = r#"<html><body><div id="px-captcha"></div></body></html>"#;
        assert!(is_blocked(html));
    }

    #[test]
    fn test_listing_with_footer_recaptcha_not_blocked() {
        let html = r#"<html><head><title>Nike Shoes | Nike UK</title></head><body>
            <div class="product-card"><h2>Air Max 90</h2><span class="price">£120</span></div>
            <footer>
              <form action="/newsletter"><div class="g-recaptcha" data-sitekey="x"></div></form>
              <iframe src="https://www.google.com/recaptcha/api2/anchor"></iframe>
              <div class="h-captcha"></div>
            </footer></body></html>"#;
        assert!(!is_blocked(html));
    }

    #[test]
    fn test_interstitial_title_blocked() {
        let html = "<html><head><title>Just a moment...</title></head><body></body></html>";
        assert!(is_blocked(html));

        let html = "<html><head><title>Access Denied</title></head><body></body></html>";
        assert!(is_blocked(html));
    }
}
