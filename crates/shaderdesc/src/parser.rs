//! Block parser for the shader description grammar.
//!
//! ```text
//! shader     := const* [ inter ] vssrc fssrc
//! const      := 'const' '{' (name ['[' N ']'] ':' type)* '}'
//! inter      := 'inter' '{' (name ':' type)* '}'
//! vssrc      := 'vssrc' '{' raw '}'
//! fssrc      := 'fssrc' '{' raw '}'
//! ```
//!
//! The parser walks an explicit state machine. Any violation returns a
//! `CompileError` immediately, so a description is either fully parsed or
//! rejected.
use std::collections::BTreeSet;

use crate::ast::{
    BlockKind, ConstantBlock, ConstantField, InterpolatedField, ShaderDescription, Stage,
    StageBody, MAX_CONST_BLOCKS, MAX_INTERPOLANTS,
};
use crate::error::{CompileError, Violation};
use crate::scanner::{Location, ScanError, Scanner, Token};
use crate::types::ShaderType;

/// Names declared by the frame constant block every stage includes.
pub const FRAME_CONSTANT_NAMES: [&str; 5] = ["_VP", "_CamPos", "_R0", "_CamDir", "_R1"];

/// Clip-space member every interpolation struct carries.
pub const POSITION_VARYING: &str = "position";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectKeyword,
    ParsingConst,
    ParsingInter,
    ExpectVsSrc,
    ExpectFsSrc,
    Done,
}

pub struct Parser<'s> {
    scanner: Scanner<'s>,
    shader: &'s str,
    constant_blocks: Vec<ConstantBlock>,
    constant_names: BTreeSet<String>,
    interpolants: Vec<InterpolatedField>,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str, shader: &'s str) -> Self {
        Self {
            scanner: Scanner::new(source),
            shader,
            constant_blocks: Vec::new(),
            constant_names: BTreeSet::new(),
            interpolants: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<ShaderDescription, CompileError> {
        let mut vertex_body = None;
        let mut fragment_body = None;
        let mut state = State::ExpectKeyword;

        while state != State::Done {
            state = match state {
                State::ExpectKeyword => self.parse_keyword()?,
                State::ParsingConst => {
                    self.parse_const_fields()?;
                    State::ExpectKeyword
                }
                State::ParsingInter => {
                    self.parse_inter_fields()?;
                    self.reject_repeated_inter()?;
                    State::ExpectVsSrc
                }
                State::ExpectVsSrc => {
                    vertex_body = Some(self.parse_stage(Stage::Vertex)?);
                    State::ExpectFsSrc
                }
                State::ExpectFsSrc => {
                    fragment_body = Some(self.parse_stage(Stage::Fragment)?);
                    State::Done
                }
                State::Done => State::Done,
            };
        }

        let trailing = self.scanner.peek_token();
        if trailing.token != Token::Eof {
            return Err(self.fail(
                BlockKind::FsSrc,
                Violation::TrailingInput(trailing.token.to_string()),
                trailing.location,
            ));
        }

        match (vertex_body, fragment_body) {
            (Some(vertex_body), Some(fragment_body)) => Ok(ShaderDescription {
                constant_blocks: self.constant_blocks,
                interpolants: self.interpolants,
                vertex_body,
                fragment_body,
            }),
            // Both bodies are assigned on the only path that reaches `Done`.
            _ => Err(self.fail(
                BlockKind::VsSrc,
                Violation::Missing(Token::Eof.to_string()),
                self.scanner.location(),
            )),
        }
    }

    fn fail(&self, block: BlockKind, violation: Violation, location: Location) -> CompileError {
        CompileError {
            shader: self.shader.to_string(),
            block,
            violation,
            location: Some(location),
        }
    }

    fn syntax(&self, block: BlockKind, err: ScanError) -> CompileError {
        let location = err.location();
        let violation = match err {
            ScanError::UnterminatedBody { .. } => Violation::Unterminated,
            other => Violation::Syntax(other.to_string()),
        };
        self.fail(block, violation, location)
    }

    fn parse_keyword(&mut self) -> Result<State, CompileError> {
        let next = self.scanner.peek_token();
        match next.token {
            Token::Word("const") => {
                self.scanner.next_token();
                if self.constant_blocks.len() >= MAX_CONST_BLOCKS {
                    return Err(self.fail(
                        BlockKind::Const,
                        Violation::TooManyConstBlocks,
                        next.location,
                    ));
                }
                self.scanner
                    .expect_char('{')
                    .map_err(|err| self.syntax(BlockKind::Const, err))?;
                let index = self.constant_blocks.len();
                self.constant_blocks.push(ConstantBlock::new(index));
                Ok(State::ParsingConst)
            }
            Token::Word("inter") => {
                self.scanner.next_token();
                self.scanner
                    .expect_char('{')
                    .map_err(|err| self.syntax(BlockKind::Inter, err))?;
                Ok(State::ParsingInter)
            }
            Token::Word("vssrc") | Token::Word("fssrc") | Token::Eof => Ok(State::ExpectVsSrc),
            other => Err(self.fail(
                BlockKind::Undefined,
                Violation::UnrecognizedBlock(other.to_string()),
                next.location,
            )),
        }
    }

    fn reject_repeated_inter(&mut self) -> Result<(), CompileError> {
        let next = self.scanner.peek_token();
        if next.token == Token::Word("inter") {
            return Err(self.fail(
                BlockKind::Inter,
                Violation::RepeatedBlock("inter".into()),
                next.location,
            ));
        }
        Ok(())
    }

    fn parse_const_fields(&mut self) -> Result<(), CompileError> {
        let block = BlockKind::Const;
        while let Some((raw, location)) = self.next_field_name(block)? {
            let (name, array_len) = split_array_suffix(raw)
                .map_err(|reason| self.malformed(block, raw, reason, location))?;
            let ty = self.parse_field_type(block, raw, location)?;

            if FRAME_CONSTANT_NAMES.contains(&name) {
                return Err(self.fail(block, Violation::ReservedField(name.to_string()), location));
            }
            if !self.constant_names.insert(name.to_string()) {
                return Err(self.fail(block, Violation::DuplicateField(name.to_string()), location));
            }

            let field = ConstantField {
                name: name.to_string(),
                array_len,
                ty,
            };
            if let Some(current) = self.constant_blocks.last_mut() {
                current.push(field);
            }
        }
        Ok(())
    }

    fn parse_inter_fields(&mut self) -> Result<(), CompileError> {
        let block = BlockKind::Inter;
        while let Some((raw, location)) = self.next_field_name(block)? {
            if self.interpolants.len() >= MAX_INTERPOLANTS {
                return Err(self.fail(block, Violation::TooManyInterpolants, location));
            }
            let (name, array_len) = split_array_suffix(raw)
                .map_err(|reason| self.malformed(block, raw, reason, location))?;
            if array_len.is_some() {
                return Err(self.malformed(
                    block,
                    raw,
                    "array varyings are not supported".to_string(),
                    location,
                ));
            }
            let ty = self.parse_field_type(block, raw, location)?;

            if name == POSITION_VARYING {
                return Err(self.fail(block, Violation::ReservedField(name.to_string()), location));
            }
            if self.interpolants.iter().any(|field| field.name == name) {
                return Err(self.fail(block, Violation::DuplicateField(name.to_string()), location));
            }

            let slot = self.interpolants.len() as u32;
            self.interpolants.push(InterpolatedField {
                name: name.to_string(),
                ty,
                slot,
            });
        }
        Ok(())
    }

    /// Returns the next field's raw name, or `None` once the closing brace is consumed.
    fn next_field_name(
        &mut self,
        block: BlockKind,
    ) -> Result<Option<(&'s str, Location)>, CompileError> {
        let next = self.scanner.next_token();
        match next.token {
            Token::RBrace => Ok(None),
            Token::Word(raw) => Ok(Some((raw, next.location))),
            Token::Eof => Err(self.fail(block, Violation::Unterminated, next.location)),
            other => Err(self.fail(
                block,
                Violation::Syntax(format!("expected a field name, found {other}")),
                next.location,
            )),
        }
    }

    fn parse_field_type(
        &mut self,
        block: BlockKind,
        raw: &str,
        location: Location,
    ) -> Result<ShaderType, CompileError> {
        self.scanner
            .expect_char(':')
            .map_err(|err| self.malformed(block, raw, err.to_string(), location))?;
        let (ty, _) = self
            .scanner
            .expect_word("a type name")
            .map_err(|err| self.malformed(block, raw, err.to_string(), location))?;
        ShaderType::from_name(ty).ok_or_else(|| {
            self.fail(
                block,
                Violation::UnknownType {
                    field: raw.to_string(),
                    ty: ty.to_string(),
                },
                location,
            )
        })
    }

    fn malformed(
        &self,
        block: BlockKind,
        raw: &str,
        reason: String,
        location: Location,
    ) -> CompileError {
        self.fail(
            block,
            Violation::MalformedField {
                field: raw.to_string(),
                reason,
            },
            location,
        )
    }

    fn parse_stage(&mut self, stage: Stage) -> Result<StageBody, CompileError> {
        let block = stage.block_kind();
        let keyword = self.scanner.peek_token();
        if self.scanner.expect_keyword(stage.keyword()).is_err() {
            return Err(self.fail(
                block,
                Violation::Missing(keyword.token.to_string()),
                keyword.location,
            ));
        }

        let brace = self.scanner.peek_token();
        if self.scanner.expect_char('{').is_err() {
            return Err(self.fail(
                block,
                Violation::Missing(brace.token.to_string()),
                brace.location,
            ));
        }

        let raw = self
            .scanner
            .read_raw_body(brace.location)
            .map_err(|err| self.syntax(block, err))?;
        Ok(StageBody::new(stage, &raw))
    }
}

/// Splits `name[N]` into its identifier and element count.
fn split_array_suffix(raw: &str) -> Result<(&str, Option<u32>), String> {
    let (name, array_len) = match raw.find('[') {
        None => (raw, None),
        Some(open) => {
            let inner = raw[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| "array suffix must end with ']'".to_string())?;
            let len = inner
                .parse::<u32>()
                .map_err(|_| format!("array length '{inner}' is not a positive integer"))?;
            if len == 0 {
                return Err("array length must be at least 1".to_string());
            }
            (&raw[..open], Some(len))
        }
    };

    if !is_identifier(name) {
        return Err(format!("'{name}' is not a valid identifier"));
    }
    Ok((name, array_len))
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
