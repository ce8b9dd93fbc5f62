// Turns a raw chat message into a command name and its arguments.

/// Split `content` into `(name, args)` if it starts with `prefix`.
///
/// Arguments are separated by whitespace; double quotes group several words into
/// one argument (`!track @ferris "some name"`). An unterminated quote runs to the
/// end of the message. The command name is lowercased.
pub fn parse_invocation(content: &str, prefix: &str) -> Option<(String, Vec<String>)> {
    if prefix.is_empty() {
        return None;
    }
    let rest = content.trim_start().strip_prefix(prefix)?;

    let mut tokens = tokenize(rest).into_iter();
    let name = tokens.next()?.to_ascii_lowercase();
    Some((name, tokens.collect()))
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    // Distinguishes `""` (an empty argument) from no argument at all.
    let mut has_token = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        tokens.push(current);
    }

    tokens
}
