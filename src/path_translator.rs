use crate::config::PathRule;

/// Lexical rewrite of workstation paths into the render node namespace.
/// Never touches the filesystem: render nodes may not see the artist's drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTranslator {
    rule: PathRule,
}

impl PathTranslator {
    pub fn new(rule: PathRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &PathRule {
        &self.rule
    }

    /// Swap the local prefix for the remote one. Paths without the prefix come back as is.
    pub fn translate(&self, path: &str) -> String {
        let local = self.rule.local_prefix.as_str();
        if local.is_empty() || !path.starts_with(local) {
            return path.to_owned();
        }
        format!("{}{}", self.rule.remote_prefix, &path[local.len()..])
    }

    /// Translate every path in a command that starts with the local prefix.
    /// A path starts a token: after whitespace, a quote, `=` or `(`.
    pub fn translate_command(&self, command: &str) -> String {
        let local = self.rule.local_prefix.as_str();
        if local.is_empty() {
            return command.to_owned();
        }

        let mut out = String::with_capacity(command.len());
        let mut copied = 0;
        for start in token_starts(command) {
            if start < copied || !command[start..].starts_with(local) {
                continue;
            }
            out.push_str(&command[copied..start]);
            out.push_str(&self.rule.remote_prefix);
            copied = start + local.len();
        }
        out.push_str(&command[copied..]);
        out
    }

    /// Whether any token of `command` still starts with the local prefix.
    pub fn contains_local_path(&self, command: &str) -> bool {
        let local = self.rule.local_prefix.as_str();
        !local.is_empty()
            && token_starts(command)
                .into_iter()
                .any(|start| command[start..].starts_with(local))
    }
}

fn is_token_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '(')
}

// byte offsets at which a token may begin, in order
fn token_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(
        text.char_indices()
            .filter(|(_, c)| is_token_boundary(*c))
            .map(|(i, c)| i + c.len_utf8()),
    );
    starts
}
