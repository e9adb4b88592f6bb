//! Content-provider queries issued through `adb shell content query`.
//!
//! CHANGELOG:
//! - 10/18/2026 - Quote the sort clause for the device shell
//! - 10/18/2026 - Initial SMS and contacts queries

/// A read-only query against a device content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentQuery {
    pub uri: &'static str,
    pub projection: &'static [&'static str],
    pub sort: Option<&'static str>,
}

/// All SMS rows (inbox and sent), newest first.
pub const SMS_MESSAGES: ContentQuery = ContentQuery {
    uri: "content://sms",
    projection: &["_id", "thread_id", "address", "date", "body", "type", "read"],
    sort: Some("date DESC"),
};

/// One row per phone number stored in the contacts provider.
pub const CONTACT_PHONES: ContentQuery = ContentQuery {
    uri: "content://com.android.contacts/data/phones",
    projection: &["display_name", "number"],
    sort: None,
};

impl ContentQuery {
    /// Arguments following `adb -s <serial>`.
    ///
    /// `adb shell` hands its arguments to the device shell as one string, so
    /// the sort clause is single-quoted to survive word splitting.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "shell".into(),
            "content".into(),
            "query".into(),
            "--uri".into(),
            self.uri.into(),
            "--projection".into(),
            self.projection.join(":"),
        ];
        if let Some(sort) = self.sort {
            args.push("--sort".into());
            args.push(format!("'{}'", sort));
        }
        args
    }
}
