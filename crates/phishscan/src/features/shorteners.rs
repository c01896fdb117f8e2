//! Known link-shortening services.
//!
//! Matching is an unanchored, case-sensitive substring test against the
//! whole URL, which is what the training data was labelled with. Entries
//! keep their original spelling and case.

/// Shortener domains, duplicates removed.
pub const SHORTENER_DOMAINS: &[&str] = &[
    "bit.ly",
    "goo.gl",
    "shorte.st",
    "go2l.ink",
    "x.co",
    "ow.ly",
    "t.co",
    "tinyurl",
    "tr.im",
    "is.gd",
    "cli.gs",
    "yfrog.com",
    "migre.me",
    "ff.im",
    "tiny.cc",
    "url4.eu",
    "twit.ac",
    "su.pr",
    "twurl.nl",
    "snipurl.com",
    "short.to",
    "BudURL.com",
    "ping.fm",
    "post.ly",
    "Just.as",
    "bkite.com",
    "snipr.com",
    "fic.kr",
    "loopt.us",
    "doiop.com",
    "short.ie",
    "kl.am",
    "wp.me",
    "rubyurl.com",
    "om.ly",
    "to.ly",
    "bit.do",
    "lnkd.in",
    "db.tt",
    "qr.ae",
    "adf.ly",
    "bitly.com",
    "cur.lv",
    "tinyurl.com",
    "ity.im",
    "q.gs",
    "po.st",
    "bc.vc",
    "twitthis.com",
    "u.to",
    "j.mp",
    "buzurl.com",
    "cutt.us",
    "u.bb",
    "yourls.org",
    "prettylinkpro.com",
    "scrnch.me",
    "filoops.info",
    "vzturl.com",
    "qr.net",
    "1url.com",
    "tweez.me",
    "v.gd",
    "link.zip.net",
];

/// Return the first shortener mentioned anywhere in `url`.
pub fn find(url: &str) -> Option<&'static str> {
    SHORTENER_DOMAINS.iter().copied().find(|d| url.contains(d))
}

/// Whether `url` mentions any known shortener.
pub fn matches(url: &str) -> bool {
    find(url).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_shorteners() {
        assert_eq!(find("http://bit.ly/xyz"), Some("bit.ly"));
        assert_eq!(find("https://tinyurl.com/abc"), Some("tinyurl"));
        assert!(matches("http://j.mp/1"));
        assert!(matches("https://lnkd.in/e4Xy"));
    }

    #[test]
    fn test_substring_semantics() {
        // Unanchored: "t.co" appears inside "about.com"
        assert!(matches("https://about.com/"));
        // Case-sensitive
        assert!(matches("http://BudURL.com/x"));
        assert!(!matches("http://BIT.LY/x"));
    }

    #[test]
    fn test_no_match() {
        assert!(!matches("https://www.rust-lang.org/learn"));
        assert!(!matches(""));
    }

    #[test]
    fn test_table_has_no_duplicates() {
        let unique: HashSet<_> = SHORTENER_DOMAINS.iter().collect();
        assert_eq!(unique.len(), SHORTENER_DOMAINS.len());
    }
}
