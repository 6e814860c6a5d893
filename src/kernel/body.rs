use crate::kernel::ArgDecl;
use fenris_tensor::Expr;
use std::fmt;

#[derive(Debug, Clone)]
pub enum Statement<T> {
    /// `target += value`
    Accumulate { target: Expr<T>, value: Expr<T> },
    /// `target = value`
    Assign { target: Expr<T>, value: Expr<T> },
}

impl<T> Statement<T> {
    pub fn accumulate(target: Expr<T>, value: Expr<T>) -> Self {
        Statement::Accumulate { target, value }
    }

    pub fn assign(target: Expr<T>, value: Expr<T>) -> Self {
        Statement::Assign { target, value }
    }

    pub fn target(&self) -> &Expr<T> {
        match self {
            Statement::Accumulate { target, .. } | Statement::Assign { target, .. } => target,
        }
    }

    pub fn value(&self) -> &Expr<T> {
        match self {
            Statement::Accumulate { value, .. } | Statement::Assign { value, .. } => value,
        }
    }
}

/// The body of a kernel, as handed over by the lowering stage.
///
/// Loop nests are implicit: free indices in a statement range over their extents.
#[derive(Debug, Clone)]
pub struct Block<T> {
    statements: Vec<Statement<T>>,
}

impl<T> Default for Block<T> {
    fn default() -> Self {
        Self { statements: Vec::new() }
    }
}

impl<T> Block<T> {
    pub fn new(statements: Vec<Statement<T>>) -> Self {
        Self { statements }
    }

    pub fn push(&mut self, statement: Statement<T>) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[Statement<T>] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Root expressions of the body, targets before values.
    pub fn expressions(&self) -> impl Iterator<Item = &Expr<T>> {
        self.statements
            .iter()
            .flat_map(|statement| [statement.target(), statement.value()])
    }
}

impl<T> FromIterator<Statement<T>> for Block<T> {
    fn from_iter<I: IntoIterator<Item = Statement<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A complete kernel function: signature and body.
#[derive(Debug, Clone)]
pub struct FunctionDecl<T> {
    qualifiers: Vec<String>,
    return_type: String,
    name: String,
    args: Vec<ArgDecl>,
    body: Block<T>,
}

impl<T> FunctionDecl<T> {
    pub fn new(return_type: impl Into<String>, name: impl Into<String>, args: Vec<ArgDecl>, body: Block<T>) -> Self {
        Self {
            qualifiers: Vec::new(),
            return_type: return_type.into(),
            name: name.into(),
            args,
            body,
        }
    }

    pub fn with_qualifiers(self, qualifiers: Vec<String>) -> Self {
        Self { qualifiers, ..self }
    }

    pub fn qualifiers(&self) -> &[String] {
        &self.qualifiers
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[ArgDecl] {
        &self.args
    }

    pub fn arg_names(&self) -> Vec<&str> {
        self.args.iter().map(ArgDecl::name).collect()
    }

    pub fn body(&self) -> &Block<T> {
        &self.body
    }

    /// The function signature, e.g. `static inline void mass(double A[3][3], ...)`.
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl<T> fmt::Display for FunctionDecl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qualifier in &self.qualifiers {
            write!(f, "{} ", qualifier)?;
        }
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (k, arg) in self.args.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
