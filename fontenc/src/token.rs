use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// A syntactic unit of an encoding file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// A name, a bare identifier (like `def` or `repeat`) or a digit sequence. `literal` is set for
    /// names that were written with a leading `/`, which is not part of `name`.
    Word { name: String, literal: bool },
}

impl Token {
    /// A bare (non-literal) word.
    pub fn word<S: Into<String>>(name: S) -> Self {
        Token::Word {
            name: name.into(),
            literal: false,
        }
    }

    /// A literal name, i.e. a word written with a leading `/`.
    pub fn literal<S: Into<String>>(name: S) -> Self {
        Token::Word {
            name: name.into(),
            literal: true,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenBracket => f.write_str("["),
            Token::CloseBracket => f.write_str("]"),
            Token::OpenBrace => f.write_str("{"),
            Token::CloseBrace => f.write_str("}"),
            Token::Word {
                name,
                literal: true,
            } => write!(f, "/{}", name),
            Token::Word {
                name,
                literal: false,
            } => f.write_str(name),
        }
    }
}

fn is_word_char(ch: char) -> bool {
    matches!(ch, '.' | '_' | '-' | 'A'..='Z' | 'a'..='z' | '0'..='9')
}

/// Splits the text of an encoding file into [`Token`]s.
///
/// Comments (`%` up to the end of the line) and all characters that neither start a word nor are
/// one of `[`, `]`, `{` and `}` are skipped. Tokenizing never fails; malformed input simply results
/// in fewer tokens.
pub struct Tokenizer<I: Iterator<Item = char>> {
    chars: Peekable<I>,
}

impl<I> Tokenizer<I>
where
    I: Iterator<Item = char>,
{
    pub fn new(chars: I) -> Self {
        Tokenizer {
            chars: chars.peekable(),
        }
    }

    fn skip_comment(&mut self) {
        for ch in &mut self.chars {
            if ch == '\n' {
                break;
            }
        }
    }

    fn read_word(&mut self, first: Option<char>) -> String {
        let mut word = String::new();
        word.extend(first);
        while let Some(ch) = self.chars.next_if(|ch| is_word_char(*ch)) {
            word.push(ch);
        }
        word
    }
}

impl<I> Iterator for Tokenizer<I>
where
    I: Iterator<Item = char>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.chars.next() {
            match ch {
                '%' => self.skip_comment(),
                '[' => return Some(Token::OpenBracket),
                ']' => return Some(Token::CloseBracket),
                '{' => return Some(Token::OpenBrace),
                '}' => return Some(Token::CloseBrace),
                '/' => {
                    let name = self.read_word(None);
                    // a `/` that is not followed by a word is dropped
                    if !name.is_empty() {
                        return Some(Token::Word {
                            name,
                            literal: true,
                        });
                    }
                }
                ch if is_word_char(ch) => {
                    return Some(Token::Word {
                        name: self.read_word(Some(ch)),
                        literal: false,
                    });
                }
                _ => {}
            }
        }

        None
    }
}

/// Creates a [`Tokenizer`] over the given encoding file contents.
pub fn tokenize(source: &str) -> Tokenizer<Chars<'_>> {
    Tokenizer::new(source.chars())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source).collect()
    }

    #[test]
    fn test_structural_tokens() {
        assert_eq!(
            tokens("[]{}"),
            vec![
                Token::OpenBracket,
                Token::CloseBracket,
                Token::OpenBrace,
                Token::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_words() {
        assert_eq!(
            tokens("/TeXBase1Encoding [/.notdef /a.sc/uni00A0 256 dup] def"),
            vec![
                Token::literal("TeXBase1Encoding"),
                Token::OpenBracket,
                Token::literal(".notdef"),
                Token::literal("a.sc"),
                Token::literal("uni00A0"),
                Token::word("256"),
                Token::word("dup"),
                Token::CloseBracket,
                Token::word("def"),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            tokens("% LIGKERN space l =: lslash ;\n/a % trailing [ ] { }\n/b\n%"),
            vec![Token::literal("a"), Token::literal("b")]
        );
    }

    #[test]
    fn test_comment_at_end_of_input() {
        assert_eq!(tokens("/a %no newline"), vec![Token::literal("a")]);
    }

    #[test]
    fn test_separators() {
        assert_eq!(
            tokens("\t/a,/b;(c)\r\n<d>"),
            vec![
                Token::literal("a"),
                Token::literal("b"),
                Token::word("c"),
                Token::word("d"),
            ]
        );
    }

    #[test]
    fn test_lone_slash_is_dropped() {
        assert_eq!(tokens("/ [ //a /"), vec![Token::OpenBracket, Token::literal("a")]);
    }

    #[test]
    fn test_slash_ends_word() {
        assert_eq!(
            tokens("a/b"),
            vec![Token::word("a"), Token::literal("b")]
        );
    }

    #[test]
    fn test_non_ascii_letters_are_separators() {
        assert_eq!(tokens("/é"), Vec::<Token>::new());
    }

    #[test]
    fn test_display() {
        let source = "/a [ 3 { /b } repeat ]";
        let rendered = tokens(source)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rendered, source);
    }
}
