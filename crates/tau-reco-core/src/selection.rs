//! String-form output selection on tau candidates
//!
//! A small cut language parsed once at pipeline construction:
//!
//! ```text
//! pt > 20 && abs(eta) < 2.3 && leadPFChargedHadrCand().isNonnull()
//! ```
//!
//! Accessors may be written with or without a trailing `()`. Any comparison
//! with a NaN operand is false, so null taus fail every numeric cut on their
//! discriminant.

use crate::error::RegistryError;
use crate::tau::Tau;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    fn eval(self, lhs: f64, rhs: f64) -> bool {
        if lhs.is_nan() || rhs.is_nan() {
            return false;
        }
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    LParen,
    RParen,
    Dot,
    Minus,
    Not,
    And,
    Or,
    Cmp(CmpOp),
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<Chars<'_>> = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '.' if !chars.clone().nth(1).is_some_and(|n| n.is_ascii_digit()) => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return Err(format!("expected '{}{}'", c, c));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Cmp(CmpOp::Ne));
                } else {
                    tokens.push(Token::Not);
                }
            }
            '<' | '>' => {
                chars.next();
                let inclusive = chars.next_if_eq(&'=').is_some();
                tokens.push(Token::Cmp(match (c, inclusive) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    ('>', false) => CmpOp::Gt,
                    _ => CmpOp::Ge,
                }));
            }
            '=' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err("expected '=='".to_string());
                }
                tokens.push(Token::Cmp(CmpOp::Eq));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(d) = chars.next_if(|d| {
                    d.is_ascii_alphanumeric() || *d == '.' || *d == '_'
                }) {
                    literal.push(d);
                }
                // exponent sign, e.g. 1e-5
                if literal.ends_with(|e: char| e == 'e' || e == 'E') {
                    if let Some(sign) = chars.next_if(|d| *d == '-' || *d == '+') {
                        literal.push(sign);
                        while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
                            literal.push(d);
                        }
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(d) = chars.next_if(|d| d.is_ascii_alphanumeric() || *d == '_') {
                    ident.push(d);
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Pt,
    Eta,
    Phi,
    Mass,
    Energy,
    Charge,
    DecayMode,
    Discriminant,
    NSignalCharged,
    NSignalPiZeros,
    NIsolationCharged,
    NIsolationPiZeros,
}

impl Field {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "pt" => Field::Pt,
            "eta" => Field::Eta,
            "phi" => Field::Phi,
            "mass" => Field::Mass,
            "energy" => Field::Energy,
            "charge" => Field::Charge,
            "decayMode" => Field::DecayMode,
            "discriminant" => Field::Discriminant,
            "nSignalCharged" => Field::NSignalCharged,
            "nSignalPiZeros" => Field::NSignalPiZeros,
            "nIsolationCharged" => Field::NIsolationCharged,
            "nIsolationPiZeros" => Field::NIsolationPiZeros,
            _ => return None,
        })
    }

    fn eval(self, tau: &Tau) -> f64 {
        match self {
            Field::Pt => tau.p4.pt(),
            Field::Eta => tau.p4.eta(),
            Field::Phi => tau.p4.phi(),
            Field::Mass => tau.p4.mass(),
            Field::Energy => tau.p4.energy,
            Field::Charge => f64::from(tau.charge),
            Field::DecayMode => f64::from(tau.decay_mode.code()),
            Field::Discriminant => tau.discriminant,
            Field::NSignalCharged => tau.signal_charged.len() as f64,
            Field::NSignalPiZeros => tau.signal_pi_zeros.len() as f64,
            Field::NIsolationCharged => tau.isolation_charged.len() as f64,
            Field::NIsolationPiZeros => tau.isolation_pi_zeros.len() as f64,
        }
    }
}

/// Reference-valued accessors, usable only through `isNonnull` / `isNull`
#[derive(Debug, Clone, Copy, PartialEq)]
enum RefAccessor {
    /// Leading signal charged hadron
    LeadChargedHadron,
    /// Particle-flow candidate behind the leading charged hadron
    LeadPfCandidate,
}

impl RefAccessor {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "leadChargedHadron" => Some(RefAccessor::LeadChargedHadron),
            "leadPFChargedHadrCand" | "leadChargedHadrCand" => Some(RefAccessor::LeadPfCandidate),
            _ => None,
        }
    }

    fn is_nonnull(self, tau: &Tau) -> bool {
        match self {
            RefAccessor::LeadChargedHadron => tau.lead_charged().is_some(),
            RefAccessor::LeadPfCandidate => tau.lead_pf_candidate().is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Number(f64),
    Abs(Box<Value>),
    Neg(Box<Value>),
    Field(Field),
}

impl Value {
    fn eval(&self, tau: &Tau) -> f64 {
        match self {
            Value::Number(v) => *v,
            Value::Abs(inner) => inner.eval(tau).abs(),
            Value::Neg(inner) => -inner.eval(tau),
            Value::Field(field) => field.eval(tau),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare { lhs: Value, op: CmpOp, rhs: Value },
    Truthy(Value),
    RefCheck { accessor: RefAccessor, non_null: bool },
}

impl Expr {
    fn eval(&self, tau: &Tau) -> bool {
        match self {
            Expr::Or(a, b) => a.eval(tau) || b.eval(tau),
            Expr::And(a, b) => a.eval(tau) && b.eval(tau),
            Expr::Not(inner) => !inner.eval(tau),
            Expr::Compare { lhs, op, rhs } => op.eval(lhs.eval(tau), rhs.eval(tau)),
            Expr::Truthy(value) => {
                let v = value.eval(tau);
                !v.is_nan() && v != 0.0
            }
            Expr::RefCheck { accessor, non_null } => accessor.is_nonnull(tau) == *non_null,
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(format!("expected {:?}, found {:?}", expected, self.peek()))
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Token::LParen) {
            let inner = self.parse_or()?;
            self.expect(&Token::RParen)?;
            return Ok(inner);
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        if let Some(Token::Ident(name)) = self.peek() {
            if let Some(accessor) = RefAccessor::lookup(name) {
                self.pos += 1;
                self.skip_call_parens()?;
                self.expect(&Token::Dot)?;
                let non_null = match self.next() {
                    Some(Token::Ident(method)) if method == "isNonnull" => true,
                    Some(Token::Ident(method)) if method == "isNull" => false,
                    other => return Err(format!("expected isNonnull/isNull, found {:?}", other)),
                };
                self.skip_call_parens()?;
                return Ok(Expr::RefCheck { accessor, non_null });
            }
        }

        let lhs = self.parse_value()?;
        match self.peek() {
            Some(Token::Cmp(op)) => {
                let op = *op;
                self.pos += 1;
                let rhs = self.parse_value()?;
                Ok(Expr::Compare { lhs, op, rhs })
            }
            _ => Ok(Expr::Truthy(lhs)),
        }
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        match self.next() {
            Some(Token::Number(v)) => Ok(Value::Number(v)),
            Some(Token::Minus) => Ok(Value::Neg(Box::new(self.parse_value()?))),
            Some(Token::Ident(name)) if name == "abs" => {
                self.expect(&Token::LParen)?;
                let inner = self.parse_value()?;
                self.expect(&Token::RParen)?;
                Ok(Value::Abs(Box::new(inner)))
            }
            Some(Token::Ident(name)) => {
                let field =
                    Field::lookup(&name).ok_or_else(|| format!("unknown accessor '{}'", name))?;
                self.skip_call_parens()?;
                Ok(Value::Field(field))
            }
            other => Err(format!("expected a value, found {:?}", other)),
        }
    }

    /// Accept an optional empty argument list `()`
    fn skip_call_parens(&mut self) -> Result<(), String> {
        if self.peek() == Some(&Token::LParen)
            && self.tokens.get(self.pos + 1) == Some(&Token::RParen)
        {
            self.pos += 2;
        }
        Ok(())
    }
}

/// Parsed output selection predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    source: String,
    expr: Expr,
}

impl Selection {
    /// Parse a cut string. Failure is a configuration error.
    pub fn parse(source: &str) -> Result<Self, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidSelection {
            selection: source.to_string(),
            reason,
        };

        let tokens = tokenize(source).map_err(invalid)?;
        if tokens.is_empty() {
            return Err(invalid("empty selection".to_string()));
        }

        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_or().map_err(invalid)?;
        if let Some(trailing) = parser.peek() {
            return Err(invalid(format!("unexpected trailing token {:?}", trailing)));
        }

        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Parse an optional configured selection; absent or blank means no filtering
    pub fn from_config(selection: Option<&str>) -> Result<Option<Self>, RegistryError> {
        match selection.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }

    pub fn passes(&self, tau: &Tau) -> bool {
        self.expr.eval(tau)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
