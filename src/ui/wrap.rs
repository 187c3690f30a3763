/// Split `text` into lines of at most `width` characters, breaking at
/// spaces where possible and hard-splitting words longer than a line.
pub fn wrap(text: &str, width: usize) -> Wrap<'_> {
    Wrap { rest: text, width }
}

pub struct Wrap<'a> {
    rest: &'a str,
    width: usize,
}

impl<'a> Iterator for Wrap<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        if rest.is_empty() || self.width == 0 {
            self.rest = "";
            return None;
        }

        let limit = rest
            .char_indices()
            .nth(self.width)
            .map_or(rest.len(), |(i, _)| i);
        if limit == rest.len() {
            self.rest = "";
            return Some(rest.trim_end());
        }

        let window = &rest[..limit];
        let split = if rest[limit..].starts_with(' ') {
            limit
        } else {
            window.rfind(' ').unwrap_or(limit)
        };
        self.rest = &rest[split..];
        Some(rest[..split].trim_end())
    }
}
