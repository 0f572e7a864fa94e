//! `Set-Cookie` attribute rewriting.
//!
//! A `Set-Cookie` value is split into `;`-separated segments. The first
//! segment is the `name=value` pair and is never touched. The remaining
//! segments are attributes, matched by name case-insensitively:
//!
//! - `Domain=...` is dropped so the cookie is scoped to whoever receives it.
//! - `Path=/...` is handled according to a [`PathPolicy`].
//! - Anything else passes through as received (trimmed).
//!
//! Nothing here fails: a value without `Path` or `Domain` comes back with
//! only its whitespace normalized.

use std::fmt;
use std::sync::Arc;

/// What to do with the `Path` attribute of a forwarded cookie.
#[derive(Clone, Default)]
pub enum PathPolicy {
    /// Force the path to `/`.
    #[default]
    Root,
    /// Leave the path exactly as received.
    Keep,
    /// Replace the path value with the function's result.
    Rewrite(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl PathPolicy {
    pub fn rewrite<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Rewrite(Arc::new(f))
    }
}

/// `false` keeps paths untouched, `true` is the default root rewrite.
impl From<bool> for PathPolicy {
    fn from(alter: bool) -> Self {
        if alter {
            Self::Root
        } else {
            Self::Keep
        }
    }
}

impl fmt::Debug for PathPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("Root"),
            Self::Keep => f.write_str("Keep"),
            Self::Rewrite(_) => f.write_str("Rewrite(..)"),
        }
    }
}

/// Rewrite a single `Set-Cookie` value.
pub fn rewrite_set_cookie(raw: &str, policy: &PathPolicy) -> String {
    let mut segments = raw.split(';').map(str::trim).filter(|s| !s.is_empty());

    let mut out: Vec<String> = Vec::new();
    if let Some(pair) = segments.next() {
        out.push(pair.to_string());
    }

    for attr in segments {
        let (name, value) = match attr.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (attr, None),
        };

        if name.eq_ignore_ascii_case("domain") && value.is_some() {
            continue;
        }

        match value {
            Some(path) if name.eq_ignore_ascii_case("path") && path.starts_with('/') => {
                match policy {
                    PathPolicy::Root => out.push("Path=/".to_string()),
                    PathPolicy::Keep => out.push(attr.to_string()),
                    PathPolicy::Rewrite(f) => out.push(format!("Path={}", f(path))),
                }
            }
            _ => out.push(attr.to_string()),
        }
    }

    out.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_forces_root_and_strips_domain() {
        let out = rewrite_set_cookie(
            "hello=world; Path=/helloworld; Domain=example.com",
            &PathPolicy::Root,
        );
        assert_eq!(out, "hello=world; Path=/");
    }

    #[test]
    fn test_repeated_attributes_are_all_handled() {
        let out = rewrite_set_cookie(
            "a=b; Domain=x.com; Path=/p; Domain=y.com; Path=/q",
            &PathPolicy::Root,
        );
        assert_eq!(out, "a=b; Path=/; Path=/");
    }

    #[test]
    fn test_domain_in_the_middle() {
        let out = rewrite_set_cookie(
            "hello=world; Max-Age=3600; domain=example.com; Path=/a; HttpOnly",
            &PathPolicy::Root,
        );
        assert_eq!(out, "hello=world; Max-Age=3600; Path=/; HttpOnly");
    }

    #[test]
    fn test_keep_policy() {
        let out = rewrite_set_cookie("abc=123; Path=/abc123", &PathPolicy::Keep);
        assert_eq!(out, "abc=123; Path=/abc123");
    }

    #[test]
    fn test_rewrite_policy_receives_upstream_path() {
        let policy = PathPolicy::rewrite(|p| {
            if p == "/abc123" {
                "/abc456".to_string()
            } else {
                p.to_string()
            }
        });
        assert_eq!(
            rewrite_set_cookie("abc=123; PATH=/abc123; Secure", &policy),
            "abc=123; Path=/abc456; Secure"
        );
        assert_eq!(
            rewrite_set_cookie("hello=world; Path=/helloworld", &policy),
            "hello=world; Path=/helloworld"
        );
    }

    #[test]
    fn test_no_path_or_domain_passes_through() {
        assert_eq!(
            rewrite_set_cookie("a=b; Secure;  HttpOnly ;", &PathPolicy::Root),
            "a=b; Secure; HttpOnly"
        );
    }

    #[test]
    fn test_relative_path_is_left_alone() {
        assert_eq!(
            rewrite_set_cookie("a=b; Path=relative", &PathPolicy::Root),
            "a=b; Path=relative"
        );
    }

    #[test]
    fn test_cookie_named_domain_is_kept() {
        assert_eq!(
            rewrite_set_cookie("Domain=x; Domain=example.com", &PathPolicy::Root),
            "Domain=x"
        );
    }

    #[test]
    fn test_from_bool() {
        assert!(matches!(PathPolicy::from(false), PathPolicy::Keep));
        assert!(matches!(PathPolicy::from(true), PathPolicy::Root));
    }
}
