use std::time::Duration;

use rand::{Rng, rng};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use robotstxt::DefaultMatcher;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Settings;
use crate::error::FetchError;

/// Where page markup comes from. The pipeline only needs the text of one
/// details page per app id.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, app_id: &str, locale: &str, country: &str) -> Result<String, FetchError>;
}

// -------------------------
// HTTP client
// -------------------------

pub struct PlayClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    robots_txt: Option<String>,
}

impl PlayClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(random_desktop_ua);

        let client = reqwest::Client::builder()
            .user_agent(user_agent.as_str())
            .default_headers(base_headers(&settings.locale))
            .redirect(reqwest::redirect::Policy::limited(8))
            .timeout(Duration::from_secs(settings.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            user_agent,
            robots_txt: None,
        })
    }

    pub fn details_url(&self, app_id: &str, locale: &str, country: &str) -> Result<Url, FetchError> {
        Ok(Url::parse_with_params(
            &self.base_url,
            &[("id", app_id), ("hl", locale), ("gl", country)],
        )?)
    }

    /// Fetch robots.txt for the marketplace host once; every later fetch is
    /// checked against it. An unreachable robots.txt allows everything.
    pub async fn load_robots(&mut self) -> Result<(), FetchError> {
        let base = Url::parse(&self.base_url)?;
        let robots_url = base.join("/robots.txt")?;
        let robots_txt = match self.client.get(robots_url.as_str()).send().await {
            Ok(rsp) => rsp.text().await.unwrap_or_default(),
            Err(e) => {
                warn!("[robots] failed to fetch {robots_url}: {e}");
                String::new()
            }
        };
        info!("[robots] loaded {} bytes from {robots_url}", robots_txt.len());
        self.robots_txt = Some(robots_txt);
        Ok(())
    }

    fn allowed_by_robots(&self, url: &Url) -> bool {
        match &self.robots_txt {
            Some(robots) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(robots, product_token(&self.user_agent), url.as_str())
            }
            None => true,
        }
    }
}

impl PageSource for PlayClient {
    async fn fetch_page(&self, app_id: &str, locale: &str, country: &str) -> Result<String, FetchError> {
        let url = self.details_url(app_id, locale, country)?;
        if !self.allowed_by_robots(&url) {
            return Err(FetchError::Disallowed(url.to_string()));
        }

        debug!("[fetch] {url}");
        let rsp = self.client.get(url.as_str()).send().await?;
        let status = rsp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let text = rsp.text().await?;
        debug!("[fetch] {url} -> status={status} len={}", text.len());
        Ok(text)
    }
}

// -------------------------
// Fetch helpers
// -------------------------

fn base_headers(locale: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    match HeaderValue::from_str(&format!("{locale},en;q=0.8")) {
        Ok(v) => {
            h.insert(ACCEPT_LANGUAGE, v);
        }
        Err(e) => warn!("skipping Accept-Language for locale {locale:?}: {e}"),
    }
    h
}

/// Product token robots.txt groups are matched against, e.g. `Mozilla` for
/// `Mozilla/5.0 (...)`.
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(['/', ' '])
        .next()
        .filter(|t| !t.is_empty())
        .unwrap_or(user_agent)
}

fn random_desktop_ua() -> String {
    const UAS: &[&str] = &[
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    ];
    let i = rng().random_range(0..UAS.len());
    UAS[i].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_url_carries_id_locale_and_country() {
        let client = PlayClient::new(&Settings::default()).unwrap();
        let url = client.details_url("com.example.app", "de", "at").unwrap();
        assert_eq!(
            url.as_str(),
            "https://play.google.com/store/apps/details?id=com.example.app&hl=de&gl=at"
        );
    }

    #[test]
    fn details_url_escapes_odd_ids() {
        let client = PlayClient::new(&Settings::default()).unwrap();
        let url = client.details_url("a b&c", "en", "us").unwrap();
        assert_eq!(url.query_pairs().next().unwrap().1, "a b&c");
    }

    #[test]
    fn robots_rules_gate_fetches() {
        let mut client = PlayClient::new(&Settings {
            user_agent: Some("Mozilla/5.0 test".into()),
            ..Settings::default()
        })
        .unwrap();
        let url = client.details_url("com.example.app", "en", "us").unwrap();
        assert!(client.allowed_by_robots(&url));

        client.robots_txt = Some("User-agent: *\nDisallow: /store/\n".into());
        assert!(!client.allowed_by_robots(&url));

        client.robots_txt = Some("User-agent: *\nDisallow: /work/\n".into());
        assert!(client.allowed_by_robots(&url));
    }

    #[test]
    fn robots_agent_groups_match_the_product_token() {
        let mut client = PlayClient::new(&Settings::default()).unwrap();
        let url = client.details_url("com.example.app", "en", "us").unwrap();

        client.robots_txt = Some("User-agent: Mozilla\nDisallow: /store/\n".into());
        assert!(!client.allowed_by_robots(&url));

        client.robots_txt = Some("User-agent: OtherBot\nDisallow: /store/\n".into());
        assert!(client.allowed_by_robots(&url));
    }

    #[test]
    fn product_token_is_the_leading_name() {
        assert_eq!(product_token("Mozilla/5.0 (X11; Linux x86_64)"), "Mozilla");
        assert_eq!(product_token("play_extract"), "play_extract");
    }

    #[test]
    fn random_ua_is_a_desktop_browser() {
        assert!(random_desktop_ua().starts_with("Mozilla/5.0"));
    }
}
