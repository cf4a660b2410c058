use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use crate::error::{Error, Malformed};
use crate::token::{tokenize, Token};

/// Maps encoding names to their glyph names, the index into the list being the code point.
pub type Encodings = BTreeMap<String, Vec<String>>;

/// The size of a complete encoding vector.
const ENCODING_SIZE: usize = 256;

/// A value on the operand stack of the [`Machine`].
#[derive(Debug, PartialEq, Clone)]
pub enum Operand {
    Name(String),
    Integer(i64),
    /// Tokens recorded between `{` and `}`, replayed by `repeat`.
    Procedure(Vec<Token>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Name(name) => write!(f, "name /{}", name),
            Operand::Integer(n) => write!(f, "integer {}", n),
            Operand::Procedure(body) => write!(f, "procedure of {} tokens", body.len()),
        }
    }
}

/// Executes the tokens of an encoding file one at a time.
///
/// Only the small subset of PostScript found in encoding files is understood: names, array
/// literals (`[` ... `]`), procedures (`{` ... `}`) and `<count> <procedure> repeat`. Closing an
/// array binds every name on the stack to the glyph names collected in between; everything else
/// (like `def` or `readonly`) is just pushed as a name.
#[derive(Debug, Default)]
pub struct Machine {
    stack: Vec<Operand>,
    current_list: Vec<String>,
    recording_procedure: bool,
    collecting_array: bool,
    encodings: Encodings,
}

impl Machine {
    pub fn new() -> Self {
        Machine::default()
    }

    /// Executes a single token. `repeat` replays its procedure through this method, so the body
    /// behaves exactly as if it had been written out `count` times.
    pub fn execute(&mut self, token: &Token) -> Result<(), Error> {
        match token {
            Token::Word {
                name,
                literal: false,
            } if name == "repeat" => self.repeat(),
            Token::CloseBrace => {
                self.recording_procedure = false;
                Ok(())
            }
            token if self.recording_procedure => self.record(token),
            Token::OpenBrace => {
                self.recording_procedure = true;
                self.stack.push(Operand::Procedure(Vec::new()));
                Ok(())
            }
            Token::OpenBracket => {
                self.collecting_array = true;
                Ok(())
            }
            Token::CloseBracket => self.close_array(),
            Token::Word { name, .. } if !self.collecting_array => {
                self.stack.push(Operand::Name(name.clone()));
                Ok(())
            }
            Token::Word {
                name,
                literal: true,
            } => {
                self.current_list.push(name.clone());
                Ok(())
            }
            Token::Word { name, .. } if is_digit_run(name) => {
                let n = name
                    .parse()
                    .map_err(|_| Malformed::IntegerOverflow(name.clone()))?;
                self.stack.push(Operand::Integer(n));
                Ok(())
            }
            // any other operator inside an array (e.g. `dup` or `put`) has no effect
            Token::Word { .. } => Ok(()),
        }
    }

    /// Executes all tokens, stopping at the first error.
    pub fn run<I>(&mut self, tokens: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Token>,
    {
        for token in tokens {
            self.execute(&token)?;
        }
        Ok(())
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Operand] {
        &self.stack
    }

    /// Consumes the machine and returns everything bound so far. Operands left on the stack are
    /// discarded.
    pub fn finish(self) -> Encodings {
        self.encodings
    }

    fn repeat(&mut self) -> Result<(), Error> {
        let body = match self.stack.pop() {
            Some(Operand::Procedure(body)) => body,
            Some(other) => return Err(Malformed::ExpectedProcedure(other.to_string()).into()),
            None => return Err(Malformed::RepeatUnderflow.into()),
        };
        let count = match self.stack.pop() {
            Some(Operand::Integer(count)) => count,
            Some(other) => return Err(Malformed::ExpectedInteger(other.to_string()).into()),
            None => return Err(Malformed::RepeatUnderflow.into()),
        };

        log::debug!("Replaying procedure of {} tokens {} times", body.len(), count);
        for _ in 0..count {
            for token in &body {
                self.execute(token)?;
            }
        }

        Ok(())
    }

    fn record(&mut self, token: &Token) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(Operand::Procedure(body)) => {
                body.push(token.clone());
                Ok(())
            }
            _ => Err(Malformed::RecordingWithoutProcedure.into()),
        }
    }

    fn close_array(&mut self) -> Result<(), Error> {
        self.collecting_array = false;

        let glyphs = mem::take(&mut self.current_list);
        while let Some(operand) = self.stack.pop() {
            let key = match operand {
                Operand::Name(key) => key,
                other => return Err(Malformed::KeyNotAName(other.to_string()).into()),
            };

            if glyphs.len() > ENCODING_SIZE {
                log::warn!(
                    "Encoding {} has {} glyph names (more than {})",
                    key,
                    glyphs.len(),
                    ENCODING_SIZE
                );
            }
            log::debug!("Binding {} to {} glyph names", key, glyphs.len());
            self.encodings.insert(key, glyphs.clone());
        }

        Ok(())
    }
}

fn is_digit_run(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

/// Tokenizes and executes a whole encoding file.
pub fn interpret(source: &str) -> Result<Encodings, Error> {
    let mut machine = Machine::new();
    machine.run(tokenize(source))?;
    Ok(machine.finish())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn glyphs(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn malformed(source: &str) -> Malformed {
        match interpret(source) {
            Err(Error::MalformedEncodingProgram(reason)) => reason,
            Ok(result) => panic!("expected an error, got {:?}", result),
        }
    }

    #[test]
    fn test_simple_array() {
        let encodings = interpret("/Foo [ /A /B /C ] def").unwrap();
        assert_eq!(encodings.len(), 1);
        assert_eq!(encodings["Foo"], glyphs(&["A", "B", "C"]));
    }

    #[test]
    fn test_comments_do_not_change_result() {
        let plain = interpret("/Foo [ /A /B 2 { /c } repeat ] def").unwrap();
        let commented = interpret(
            "% header\n/Foo % key\n[ % open\n/A\n% between\n/B 2 {\n% in procedure\n/c } repeat\n] def\n%",
        )
        .unwrap();
        assert_eq!(commented, plain);
    }

    #[test]
    fn test_aliases_get_independent_copies() {
        let mut encodings = interpret("/a /b [ /g0 /g1 ] def").unwrap();
        assert_eq!(encodings["a"], glyphs(&["g0", "g1"]));
        assert_eq!(encodings["b"], glyphs(&["g0", "g1"]));

        encodings.get_mut("a").unwrap().push("g2".to_string());
        encodings.get_mut("a").unwrap()[0] = "x".to_string();
        assert_eq!(encodings["a"], glyphs(&["x", "g1", "g2"]));
        assert_eq!(encodings["b"], glyphs(&["g0", "g1"]));
    }

    #[test]
    fn test_current_list_is_reset() {
        let mut machine = Machine::new();
        machine.run(tokenize("/a [ /x /y ] /b [ /z ]")).unwrap();
        assert!(machine.stack().is_empty());
        let encodings = machine.finish();
        assert_eq!(encodings["a"], glyphs(&["x", "y"]));
        assert_eq!(encodings["b"], glyphs(&["z"]));
    }

    #[test]
    fn test_leftover_names_are_bound_by_next_array() {
        let encodings = interpret("/A [ /x ] def /B [ /y ] def").unwrap();
        assert_eq!(encodings["A"], glyphs(&["x"]));
        assert_eq!(encodings["B"], glyphs(&["y"]));
        assert_eq!(encodings["def"], glyphs(&["y"]));
    }

    #[test]
    fn test_repeat_equals_inlining() {
        let repeated = interpret("/E [ /a 3 { /.notdef /b } repeat /c ]").unwrap();
        let inlined =
            interpret("/E [ /a /.notdef /b /.notdef /b /.notdef /b /c ]").unwrap();
        assert_eq!(repeated, inlined);
    }

    #[test]
    fn test_repeat_replays_brackets() {
        let repeated = interpret("/outer [ /a 2 { /b ] /k [ /c } repeat /d ]").unwrap();
        let inlined = interpret("/outer [ /a /b ] /k [ /c /b ] /k [ /c /d ]").unwrap();
        assert_eq!(repeated, inlined);
        assert_eq!(repeated["outer"], glyphs(&["a", "b"]));
        assert_eq!(repeated["k"], glyphs(&["c", "d"]));
    }

    #[test]
    fn test_repeat_replays_open_brace() {
        // the replayed `{` leaves recording switched on, so `/c` ends up in a new procedure
        let mut machine = Machine::new();
        machine.run(tokenize("/e [ /a 1 { /b { } repeat /c")).unwrap();
        assert_eq!(
            machine.stack(),
            &[
                Operand::Name("e".to_string()),
                Operand::Procedure(vec![Token::literal("c")]),
            ]
        );

        let mut inlined = Machine::new();
        inlined.run(tokenize("/e [ /a /b { /c")).unwrap();
        assert_eq!(machine.stack(), inlined.stack());

        // the open procedure is still on the stack when the array closes
        assert_eq!(
            machine.run(tokenize("} /d ]")).unwrap_err(),
            Error::from(Malformed::KeyNotAName("procedure of 1 tokens".to_string()))
        );
        assert_eq!(
            inlined.run(tokenize("} /d ]")).unwrap_err(),
            Error::from(Malformed::KeyNotAName("procedure of 1 tokens".to_string()))
        );
    }

    #[test]
    fn test_repeat_zero_times() {
        let encodings = interpret("/E [ /a 0 { /b } repeat /c ]").unwrap();
        assert_eq!(encodings["E"], glyphs(&["a", "c"]));
    }

    #[test]
    fn test_repeat_full_encoding() {
        let _ = env_logger::builder().is_test(true).try_init();
        let encodings = interpret("/E [ 256 { /.notdef } repeat ] def").unwrap();
        assert_eq!(encodings["E"], vec![".notdef".to_string(); 256]);
    }

    #[test]
    fn test_integers_outside_arrays_are_names() {
        let mut machine = Machine::new();
        machine.run(tokenize("/a 12 def")).unwrap();
        assert_eq!(
            machine.stack(),
            &[
                Operand::Name("a".to_string()),
                Operand::Name("12".to_string()),
                Operand::Name("def".to_string()),
            ]
        );
        assert!(machine.finish().is_empty());
    }

    #[test]
    fn test_unknown_operators_in_array_are_ignored() {
        let encodings = interpret("/E [ /a dup /b readonly ]").unwrap();
        assert_eq!(encodings["E"], glyphs(&["a", "b"]));
    }

    #[test]
    fn test_stray_brackets() {
        assert!(interpret("]").unwrap().is_empty());
        assert!(interpret("} }").unwrap().is_empty());
        assert_eq!(interpret("/a [ /x ] ]").unwrap()["a"], glyphs(&["x"]));
    }

    #[test]
    fn test_procedure_records_raw_tokens() {
        let mut machine = Machine::new();
        machine.run(tokenize("{ /a [ b 1 ] }")).unwrap();
        assert_eq!(
            machine.stack(),
            &[Operand::Procedure(vec![
                Token::literal("a"),
                Token::OpenBracket,
                Token::word("b"),
                Token::word("1"),
                Token::CloseBracket,
            ])]
        );
    }

    #[test]
    fn test_repeat_underflow() {
        assert_eq!(malformed("repeat"), Malformed::RepeatUnderflow);
        assert_eq!(malformed("[ { /a } repeat"), Malformed::RepeatUnderflow);
    }

    #[test]
    fn test_repeat_expects_procedure() {
        assert_eq!(
            malformed("[ 1 2 repeat"),
            Malformed::ExpectedProcedure("integer 2".to_string())
        );
    }

    #[test]
    fn test_repeat_expects_integer() {
        assert_eq!(
            malformed("/n [ { /a } repeat"),
            Malformed::ExpectedInteger("name /n".to_string())
        );
        // outside of arrays digit runs are names
        assert_eq!(
            malformed("3 { /a } repeat"),
            Malformed::ExpectedInteger("name /3".to_string())
        );
    }

    #[test]
    fn test_integer_overflow() {
        assert_eq!(
            malformed("[ 99999999999999999999 { /a } repeat ]"),
            Malformed::IntegerOverflow("99999999999999999999".to_string())
        );
    }

    #[test]
    fn test_key_must_be_a_name() {
        assert_eq!(
            malformed("/a [ 3 ]"),
            Malformed::KeyNotAName("integer 3".to_string())
        );
        assert_eq!(
            malformed("/a { /b } [ ]"),
            Malformed::KeyNotAName("procedure of 1 tokens".to_string())
        );
    }

    #[test]
    fn test_recording_without_procedure() {
        // `repeat` is dispatched before recording, taking the open procedure off the stack
        assert_eq!(
            malformed("[ 1 { repeat /a"),
            Malformed::RecordingWithoutProcedure
        );
    }

    #[test]
    fn test_interpret_is_deterministic() {
        let source = "/A /B [ /x 2 { /y } repeat ] def";
        assert_eq!(interpret(source).unwrap(), interpret(source).unwrap());
    }
}
