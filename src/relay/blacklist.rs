/// Denylist of channel-name fragments exempt from relaying.
///
/// Matching is a case-sensitive substring test. An unknown channel name is
/// never blocked: when the name cannot be resolved the message is relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blacklist {
    terms: Vec<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new(["dark", "r18"])
    }
}

impl Blacklist {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(Into::into)
                .filter(|term: &String| !term.is_empty())
                .collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_blacklisted(&self, channel_name: Option<&str>) -> bool {
        channel_name.is_some_and(|name| self.terms.iter().any(|term| name.contains(term.as_str())))
    }
}
