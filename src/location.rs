//! Current-location abstraction for callback detection.
//!
//! SYSTEM CONTEXT
//! ==============
//! In a browser this is `window.location` plus `history.replaceState`. Natively
//! the href comes from the loopback redirect listener or a pasted URL, and
//! "replacing" it just records the cleaned URL.

/// Read and replace the current location without navigating.
pub trait Location {
    /// The full current URL.
    fn href(&self) -> String;

    /// Replace the current URL in place (no navigation, no reload).
    fn replace(&mut self, url: &str);
}

/// In-memory location that keeps every replacement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLocation {
    href: String,
    replaced: Vec<String>,
}

impl PageLocation {
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into(), replaced: Vec::new() }
    }

    /// URLs passed to [`Location::replace`], oldest first.
    #[must_use]
    pub fn replaced(&self) -> &[String] {
        &self.replaced
    }
}

impl Location for PageLocation {
    fn href(&self) -> String {
        self.href.clone()
    }

    fn replace(&mut self, url: &str) {
        url.clone_into(&mut self.href);
        self.replaced.push(url.to_owned());
    }
}
