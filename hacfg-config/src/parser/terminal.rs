//! Terminal matchers
//!
//! Character classes used by the grammar. Each class carries the
//! description reported in parse errors when it fails to match.

/// A single-character predicate with its error description
#[derive(Debug, Clone, Copy)]
pub struct CharClass {
    pub description: &'static str,
    pub matches: fn(char) -> bool,
}

impl CharClass {
    pub fn test(&self, c: char) -> bool {
        (self.matches)(c)
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_newline(c: char) -> bool {
    c == '\n'
}

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

fn is_dns_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.')
}

fn is_password_char(c: char) -> bool {
    !matches!(c, '#' | '\n' | ' ')
}

fn is_value_char(c: char) -> bool {
    !matches!(c, '#' | '\n')
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub const BLANK: CharClass = CharClass {
    description: "[ \\t]",
    matches: is_blank,
};

pub const NEWLINE: CharClass = CharClass {
    description: "[\\n]",
    matches: is_newline,
};

pub const KEYWORD: CharClass = CharClass {
    description: "[a-z0-9\\-\\_\\.]",
    matches: is_keyword_char,
};

/// Proxy, server, acl, backend, group and user names
pub const NAME: CharClass = CharClass {
    description: "[a-zA-Z0-9\\-\\_\\.:]",
    matches: is_name_char,
};

pub const DNS: CharClass = CharClass {
    description: "[a-zA-Z\\-\\.\\d]",
    matches: is_dns_char,
};

pub const PASSWORD: CharClass = CharClass {
    description: "[^#\\n ]",
    matches: is_password_char,
};

/// Free text up to a comment or the end of the line
pub const VALUE: CharClass = CharClass {
    description: "[^#\\n]",
    matches: is_value_char,
};

pub const DIGIT: CharClass = CharClass {
    description: "[\\d]",
    matches: is_digit,
};

/// Section keywords a generic config line may not start with
pub const SECTION_KEYWORDS: &[&str] = &[
    "defaults", "global", "userlist", "listen", "frontend", "backend",
];
