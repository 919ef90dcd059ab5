//! Second pass: statement parsing
//!
//! Statement forms are matched in fixed precedence order (first match
//! wins): `nop`, the `--` decrement jump, conditional jumps, plain
//! `jump`, `fork`, `<=>` comparison, the assignment operators, `data`.

use viruswars_spec::{
    Instruction, Param, Register, DATA_VALUE_MAX, DATA_VALUE_MIN, LITERAL_MAX, LITERAL_MIN,
};

use crate::error::{AssembleError, AssembleWarning};
use crate::symbols::{LabelTable, SymbolTable};

/// Per-statement parsing context
pub struct LineContext<'a> {
    pub line: usize,
    pub address: usize,
    pub symbols: &'a SymbolTable,
    pub labels: &'a LabelTable,
}

/// Parse one normalized statement into an instruction
pub fn parse_statement(
    text: &str,
    ctx: &LineContext<'_>,
    warnings: &mut Vec<AssembleWarning>,
) -> Result<Instruction, AssembleError> {
    let tokens: Vec<&str> = text.split(' ').collect();

    match tokens.as_slice() {
        ["nop"] => Ok(Instruction::Nop),

        ["jump", addr, "if", cond, op, comparand] => {
            if *comparand != "0" {
                return Err(AssembleError::BadComparand {
                    line: ctx.line,
                    operand: comparand.to_string(),
                });
            }
            let offset = parse_operand(addr, ctx)?;
            if let Some(counter) = cond.strip_prefix("--") {
                if *op != "!=" {
                    return Err(AssembleError::BadCondition {
                        line: ctx.line,
                        operator: op.to_string(),
                    });
                }
                let counter = parse_operand(counter, ctx)?;
                return Ok(Instruction::DecJumpNotZero { counter, offset });
            }
            let cond = parse_operand(cond, ctx)?;
            match *op {
                "==" => Ok(Instruction::JumpZero { cond, offset }),
                "!=" => Ok(Instruction::JumpNotZero { cond, offset }),
                "<" => Ok(Instruction::JumpLess { cond, offset }),
                ">" => Ok(Instruction::JumpGreater { cond, offset }),
                _ => Err(AssembleError::UnknownStatement {
                    line: ctx.line,
                    statement: text.to_string(),
                }),
            }
        }

        ["jump", addr] => Ok(Instruction::Jump {
            offset: parse_operand(addr, ctx)?,
        }),

        ["fork", addr] => Ok(Instruction::Fork {
            offset: parse_operand(addr, ctx)?,
        }),

        [lhs, "<=>", rhs] => Ok(Instruction::Compare {
            lhs: parse_operand(lhs, ctx)?,
            rhs: parse_operand(rhs, ctx)?,
        }),

        [dst_token, op, src] if is_assign_op(op) => {
            let dst = parse_operand(dst_token, ctx)?;
            let src = parse_operand(src, ctx)?;
            if dst.is_literal() {
                warnings.push(AssembleWarning {
                    line: ctx.line,
                    message: format!(
                        "destination `{}` is a literal immediate; the write will fault at runtime",
                        dst_token
                    ),
                });
            }
            Ok(match *op {
                "=" => Instruction::Assign { dst, src },
                "+=" => Instruction::Add { dst, src },
                "-=" => Instruction::Sub { dst, src },
                "*=" => Instruction::Mul { dst, src },
                "/=" => Instruction::Div { dst, src },
                _ => Instruction::Mod { dst, src },
            })
        }

        ["data", expr @ ..] if !expr.is_empty() => {
            let value = parse_expression(expr, ctx)?;
            if !(DATA_VALUE_MIN as i64..=DATA_VALUE_MAX as i64).contains(&value) {
                return Err(AssembleError::DataOutOfRange {
                    line: ctx.line,
                    value,
                });
            }
            Ok(Instruction::Data {
                value: value as i32,
            })
        }

        _ => Err(AssembleError::UnknownStatement {
            line: ctx.line,
            statement: text.to_string(),
        }),
    }
}

fn is_assign_op(op: &str) -> bool {
    matches!(op, "=" | "+=" | "-=" | "*=" | "/=" | "%=")
}

/// Parse one operand token: `@{0,2}` dereference prefix followed by a
/// register (`r1..r16`, `s1..s16`) or a numeric term.
pub fn parse_operand(token: &str, ctx: &LineContext<'_>) -> Result<Param, AssembleError> {
    let deref = token.chars().take_while(|&c| c == '@').count();
    if deref > 2 {
        return Err(AssembleError::TooManyDereferences {
            line: ctx.line,
            token: token.to_string(),
        });
    }
    let body = &token[deref..];
    if body.is_empty() {
        return Err(AssembleError::InvalidOperand {
            line: ctx.line,
            token: token.to_string(),
        });
    }

    if let Some(reg) = parse_register(body, ctx)? {
        return Ok(Param::Register {
            reg,
            deref: deref as u8,
        });
    }

    let value = parse_term(body, ctx)?;
    if !(LITERAL_MIN as i64..=LITERAL_MAX as i64).contains(&value) {
        return Err(AssembleError::LiteralOutOfRange {
            line: ctx.line,
            value,
        });
    }
    if deref == 0 {
        Ok(Param::Literal {
            value: value as i16,
        })
    } else {
        Ok(Param::Indirect {
            offset: value as i16,
            deref: deref as u8,
        })
    }
}

/// Recognize `(r|s)\d{1,2}`. Returns Ok(None) for tokens that are not
/// register-shaped at all, so they can fall through to term parsing.
fn parse_register(body: &str, ctx: &LineContext<'_>) -> Result<Option<Register>, AssembleError> {
    let bank = match body.chars().next() {
        Some('r') => false,
        Some('s') => true,
        _ => return Ok(None),
    };
    let digits = &body[1..];
    if digits.is_empty()
        || digits.len() > 2
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Ok(None);
    }
    let n: u8 = digits.parse().map_err(|_| AssembleError::InvalidRegister {
        line: ctx.line,
        token: body.to_string(),
    })?;
    let reg = if bank {
        Register::shared(n)
    } else {
        Register::private(n)
    };
    reg.map(Some).map_err(|_| AssembleError::InvalidRegister {
        line: ctx.line,
        token: body.to_string(),
    })
}

/// Resolve one term: decimal, `0x` hex, a predefined symbol, or a label
/// (labels are PC-relative: `address(label) - current_address`).
fn parse_term(token: &str, ctx: &LineContext<'_>) -> Result<i64, AssembleError> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if body.chars().all(|c| c.is_ascii_digit()) && !body.is_empty() {
        body.parse::<i64>().ok()
    } else {
        None
    };

    if let Some(v) = magnitude {
        return Ok(if negative { -v } else { v });
    }

    if negative {
        // `-label` is not part of the grammar
        return Err(AssembleError::InvalidOperand {
            line: ctx.line,
            token: token.to_string(),
        });
    }

    if let Some(v) = ctx.symbols.lookup(body, ctx.address) {
        return Ok(v);
    }
    if let Some(addr) = ctx.labels.address_of(body) {
        return Ok(addr as i64 - ctx.address as i64);
    }

    Err(AssembleError::UnknownSymbol {
        line: ctx.line,
        name: body.to_string(),
    })
}

/// Evaluate a `data` expression: terms joined by `+ - * /`, with the
/// usual multiplicative precedence, no parentheses.
fn parse_expression(tokens: &[&str], ctx: &LineContext<'_>) -> Result<i64, AssembleError> {
    let mut iter = tokens.iter();
    let first = iter
        .next()
        .ok_or_else(|| AssembleError::BadExpression {
            line: ctx.line,
            detail: "empty expression".to_string(),
        })?;

    let mut sum = 0i64;
    let mut product = parse_term(first, ctx)?;

    loop {
        let Some(op) = iter.next() else {
            return Ok(sum + product);
        };
        let term = iter.next().ok_or_else(|| AssembleError::BadExpression {
            line: ctx.line,
            detail: format!("dangling operator `{}`", op),
        })?;
        let value = parse_term(term, ctx)?;
        match *op {
            "+" => {
                sum += product;
                product = value;
            }
            "-" => {
                sum += product;
                product = -value;
            }
            "*" => product *= value,
            "/" => {
                if value == 0 {
                    return Err(AssembleError::BadExpression {
                        line: ctx.line,
                        detail: "division by zero".to_string(),
                    });
                }
                product /= value;
            }
            _ => {
                return Err(AssembleError::BadExpression {
                    line: ctx.line,
                    detail: format!("unknown operator `{}`", op),
                })
            }
        }
    }
}
