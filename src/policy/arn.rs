//! Amazon Resource Name parsing
//!
//! Only the segment layout is checked:
//! `arn:partition:service:region:account-id:resource`.
//! The resource part may itself contain `:` (e.g. `function:hello:live`).

/// A borrowed view over the six segments of an ARN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account_id: &'a str,
    pub resource: &'a str,
}

impl<'a> Arn<'a> {
    const PREFIX: &'static str = "arn";

    /// Parse an ARN, returning `None` if the segment layout is wrong
    ///
    /// # Examples
    /// ```
    /// use funcurl_policy::policy::Arn;
    ///
    /// let arn = Arn::parse("arn:aws:iam::123456789012:root").unwrap();
    /// assert_eq!(arn.account_id, "123456789012");
    /// assert!(Arn::parse("123456789012").is_none());
    /// ```
    pub fn parse(s: &'a str) -> Option<Self> {
        let mut parts = s.splitn(6, ':');
        if parts.next()? != Self::PREFIX {
            return None;
        }

        let partition = parts.next()?;
        let service = parts.next()?;
        let region = parts.next()?;
        let account_id = parts.next()?;
        let resource = parts.next()?;

        if partition.is_empty() || service.is_empty() || resource.is_empty() {
            return None;
        }

        Some(Arn {
            partition,
            service,
            region,
            account_id,
            resource,
        })
    }
}

/// Extract the account ID from an account principal value
///
/// Falls back to the raw value when it is not a well-formed ARN or the ARN
/// carries no account segment.
pub fn account_id(value: &str) -> &str {
    match Arn::parse(value) {
        Some(arn) if !arn.account_id.is_empty() => arn.account_id,
        _ => value,
    }
}
