use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use super::{Condition, ConditionError};
use crate::model::RowMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    const TOKENS: [(&'static str, CompareOp); 8] = [("==", CompareOp::Eq),
                                                    ("!=", CompareOp::Ne),
                                                    ("<>", CompareOp::Ne),
                                                    ("<=", CompareOp::Le),
                                                    (">=", CompareOp::Ge),
                                                    ("=", CompareOp::Eq),
                                                    ("<", CompareOp::Lt),
                                                    (">", CompareOp::Gt)];

    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Comparación `campo op literal`. El literal se interpreta como JSON
/// (`10`, `"abc"`, `true`, `null`); si no es JSON válido se toma como string.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    clause: Option<(String, CompareOp, Value)>,
}

impl FieldCondition {
    /// Condición sin cláusula: nunca dispara.
    pub fn empty() -> Self {
        Self { clause: None }
    }

    pub fn new(field: impl Into<String>, op: CompareOp, literal: Value) -> Self {
        Self { clause: Some((field.into(), op, literal)) }
    }

    /// Parsea `"value > 10"`. Un texto vacío produce una condición vacía.
    pub fn parse(text: &str) -> Result<Self, ConditionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::empty());
        }
        // el operador más a la izquierda; a igual posición, el más largo
        let found = CompareOp::TOKENS.iter()
                                     .filter_map(|(token, op)| text.find(*token).map(|pos| (pos, *token, *op)))
                                     .min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())));
        if let Some((pos, token, op)) = found {
            let field = text[..pos].trim();
            let literal = text[pos + token.len()..].trim();
            if field.is_empty() || literal.is_empty() {
                return Err(ConditionError::Parse(text.to_string()));
            }
            let value = serde_json::from_str(literal).unwrap_or_else(|_| Value::String(literal.to_string()));
            return Ok(Self::new(field, op, value));
        }
        Err(ConditionError::Parse(text.to_string()))
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

impl Condition for FieldCondition {
    fn evaluate(&self, meta: &RowMeta, row: &[Value]) -> Result<bool, ConditionError> {
        let Some((field, op, literal)) = &self.clause else {
            return Ok(false);
        };
        let value = meta.index_of(field)
                        .and_then(|i| row.get(i))
                        .ok_or_else(|| ConditionError::UnknownField(field.clone()))?;
        // null contra no-null: sólo tiene sentido la (des)igualdad
        if value.is_null() != literal.is_null() {
            return match op {
                CompareOp::Eq => Ok(false),
                CompareOp::Ne => Ok(true),
                _ => Err(ConditionError::Incomparable { field: field.clone(),
                                                        literal: literal.to_string() }),
            };
        }
        let ord = compare(value, literal).ok_or_else(|| ConditionError::Incomparable { field: field.clone(),
                                                                                       literal: literal.to_string() })?;
        Ok(op.holds(ord))
    }

    fn is_empty(&self) -> bool {
        self.clause.is_none()
    }

    fn expression(&self) -> String {
        match &self.clause {
            Some((field, op, literal)) => format!("{field} {op} {literal}"),
            None => String::new(),
        }
    }
}
