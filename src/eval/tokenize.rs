//! The "13a" tokenizer from the WMT mteval-v13a script, as used for BLEU.

use anyhow::Result;
use regex::Regex;

/// Splits punctuation away from words before n-gram counting.
pub struct Tokenizer13a {
    rules: Vec<(Regex, &'static str)>,
}

impl Tokenizer13a {
    pub fn new() -> Result<Self> {
        let rules = vec![
            // any punctuation except '.' and ','
            (Regex::new(r"([{-~\[-\x60 -&(-+:-@/])")?, " ${1} "),
            // period and comma unless preceded by a digit
            (Regex::new(r"([^0-9])([.,])")?, "${1} ${2} "),
            // period and comma unless followed by a digit
            (Regex::new(r"([.,])([^0-9])")?, " ${1} ${2}"),
            // dash after a digit
            (Regex::new(r"([0-9])(-)")?, "${1} ${2} "),
        ];
        Ok(Self { rules })
    }

    /// Tokenize one line into whitespace-separated tokens.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        let mut line = line
            .replace("<skipped>", "")
            .replace("-\n", "")
            .replace('\n', " ");

        if line.contains('&') {
            line = line
                .replace("&quot;", "\"")
                .replace("&amp;", "&")
                .replace("&lt;", "<")
                .replace("&gt;", ">");
        }

        let mut line = format!(" {line} ");
        for (re, replacement) in &self.rules {
            line = re.replace_all(&line, *replacement).into_owned();
        }

        line.split_whitespace().map(str::to_string).collect()
    }
}
