//! Algolia host selection: primary DSN/write host plus shared fallbacks

/// Which kind of call is being made; reads and writes start on different hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Write,
}

/// Ordered host list for one application.
#[derive(Debug, Clone)]
pub struct Hosts {
    read: Vec<String>,
    write: Vec<String>,
}

impl Hosts {
    /// Default Algolia topology for `app_id`.
    pub fn for_app(app_id: &str) -> Self {
        let fallbacks: Vec<String> = (1..=3)
            .map(|n| format!("https://{app_id}-{n}.algolianet.com"))
            .collect();

        let mut read = vec![format!("https://{app_id}-dsn.algolia.net")];
        read.extend(fallbacks.iter().cloned());
        let mut write = vec![format!("https://{app_id}.algolia.net")];
        write.extend(fallbacks);

        Self { read, write }
    }

    /// Explicit host list for every call (proxies, local test servers).
    ///
    /// `base_url` is one URL or several separated by commas, tried in order.
    pub fn fixed(base_url: &str) -> Self {
        let hosts: Vec<String> = base_url
            .split(',')
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .map(String::from)
            .collect();
        Self {
            read: hosts.clone(),
            write: hosts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read.is_empty() || self.write.is_empty()
    }

    pub fn for_call(&self, kind: CallKind) -> &[String] {
        match kind {
            CallKind::Read => &self.read,
            CallKind::Write => &self.write,
        }
    }
}
