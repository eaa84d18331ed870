//! Assertion checking for scenario expectations

use super::parser::StateAssertion;

/// Numeric equality slack for `=` and `!=`
const NUMBER_TOLERANCE: f32 = 1e-3;

/// Error when an assertion fails
#[derive(Debug, Clone)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

/// Where the ledge that shaped a tick's movement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgeSource {
    None,
    Blocking,
    Gap,
    Recovery,
}

impl LedgeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            LedgeSource::None => "none",
            LedgeSource::Blocking => "blocking",
            LedgeSource::Gap => "gap",
            LedgeSource::Recovery => "recovery",
        }
    }
}

/// AI state captured after a tick
#[derive(Debug, Clone, PartialEq)]
pub struct AiSnapshot {
    pub x: f32,
    pub y: f32,
    pub run: f32,
    pub jump: bool,
    pub slide: bool,
    pub facing_right: bool,
    pub blocked: bool,
    pub falling: bool,
    pub ledge: LedgeSource,
    pub ledge_x: Option<f32>,
}

/// Everything a check can look at after a tick
#[derive(Debug, Clone, Default)]
pub struct ScenarioState {
    pub tick: u64,
    pub ai: Option<AiSnapshot>,
    pub catalog_level: Option<String>,
    pub catalog_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Number(f32),
    Bool(bool),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parse a check string into (path, operator, value)
fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, etc.)
    for op in &[">=", "<=", "!=", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            return Some((path, op, value));
        }
    }
    None
}

fn side(right: bool) -> Value {
    Value::Text(if right { "right" } else { "left" }.to_string())
}

fn lookup(path: &str, state: &ScenarioState) -> Result<Value, AssertionError> {
    let parts: Vec<&str> = path.split('.').collect();
    let unknown = || AssertionError {
        message: format!("Unknown property: {}", path),
        expected: "ai.{run,jump,slide,facing,ledge,ledge_x,blocked,falling,x,y} or catalog.{level,size}"
            .to_string(),
        actual: path.to_string(),
    };

    match parts.as_slice() {
        ["catalog", "level"] => Ok(Value::Text(
            state.catalog_level.clone().unwrap_or_else(|| "none".to_string()),
        )),
        ["catalog", "size"] => Ok(Value::Number(state.catalog_size as f32)),
        ["ai", property] => {
            let ai = state.ai.as_ref().ok_or_else(|| AssertionError {
                message: format!("No AI entity at tick {}", state.tick),
                expected: path.to_string(),
                actual: "missing".to_string(),
            })?;
            match *property {
                "run" => Ok(Value::Number(ai.run)),
                "jump" => Ok(Value::Bool(ai.jump)),
                "slide" => Ok(Value::Bool(ai.slide)),
                "facing" => Ok(side(ai.facing_right)),
                "blocked" => Ok(Value::Bool(ai.blocked)),
                "falling" => Ok(Value::Bool(ai.falling)),
                "ledge" => Ok(Value::Text(ai.ledge.as_str().to_string())),
                "ledge_x" => Ok(ai
                    .ledge_x
                    .map_or_else(|| Value::Text("none".to_string()), Value::Number)),
                "x" => Ok(Value::Number(ai.x)),
                "y" => Ok(Value::Number(ai.y)),
                _ => Err(unknown()),
            }
        }
        _ => Err(unknown()),
    }
}

fn compare(actual: &Value, operator: &str, expected: &str) -> Result<bool, String> {
    match actual {
        Value::Number(a) => {
            let e: f32 = expected
                .parse()
                .map_err(|_| format!("expected a number, got '{}'", expected))?;
            Ok(match operator {
                "=" => (a - e).abs() <= NUMBER_TOLERANCE,
                "!=" => (a - e).abs() > NUMBER_TOLERANCE,
                ">" => *a > e,
                "<" => *a < e,
                ">=" => *a >= e,
                "<=" => *a <= e,
                _ => return Err(format!("unsupported operator '{}'", operator)),
            })
        }
        Value::Bool(_) | Value::Text(_) => {
            let expected_value = match actual {
                Value::Bool(_) => Value::Bool(
                    expected
                        .parse()
                        .map_err(|_| format!("expected true or false, got '{}'", expected))?,
                ),
                _ => Value::Text(expected.to_string()),
            };
            match operator {
                "=" => Ok(*actual == expected_value),
                "!=" => Ok(*actual != expected_value),
                _ => Err(format!("operator '{}' needs a numeric property", operator)),
            }
        }
    }
}

/// Check state assertions against captured scenario state
pub fn check_state(assertion: &StateAssertion, state: &ScenarioState) -> Result<(), AssertionError> {
    for check in &assertion.checks {
        let (path, operator, expected_value) = parse_check(check).ok_or_else(|| AssertionError {
            message: format!("Invalid check syntax: {}", check),
            expected: "format: 'ai.property = value' or 'ai.property > value'".to_string(),
            actual: check.clone(),
        })?;

        let actual = lookup(path, state)?;
        let passed = compare(&actual, operator, expected_value).map_err(|reason| AssertionError {
            message: format!("Invalid value in check '{}': {}", check, reason),
            expected: expected_value.to_string(),
            actual: actual.to_string(),
        })?;

        if !passed {
            return Err(AssertionError {
                message: format!("Tick {}: check failed: {}", state.tick, check),
                expected: format!("{} {}", operator, expected_value),
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}
