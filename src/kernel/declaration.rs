use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
    Const,
    Restrict,
}

impl Qualifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Qualifier::Const => "const",
            Qualifier::Restrict => "restrict",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of a single kernel argument.
///
/// An argument is either an array of fixed rank (`double A[3][3]`) or a pointer with one or
/// more levels of indirection, each carrying its own qualifiers
/// (`const double *const restrict *restrict coords`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgDecl {
    type_name: String,
    name: String,
    rank: Vec<usize>,
    pointers: Vec<Vec<Qualifier>>,
    qualifiers: Vec<Qualifier>,
}

impl ArgDecl {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            rank: Vec::new(),
            pointers: Vec::new(),
            qualifiers: Vec::new(),
        }
    }

    pub fn with_rank(self, rank: Vec<usize>) -> Self {
        Self { rank, ..self }
    }

    /// Adds a level of indirection. The first call adds the outermost pointer.
    pub fn with_pointer(mut self, qualifiers: Vec<Qualifier>) -> Self {
        self.pointers.push(qualifiers);
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> &[usize] {
        &self.rank
    }

    pub fn pointers(&self) -> &[Vec<Qualifier>] {
        &self.pointers
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    pub fn is_const(&self) -> bool {
        self.qualifiers.contains(&Qualifier::Const)
    }
}

impl fmt::Display for ArgDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for qualifier in &self.qualifiers {
            write!(f, "{} ", qualifier)?;
        }
        write!(f, "{} ", self.type_name)?;
        for pointer in &self.pointers {
            write!(f, "*")?;
            for qualifier in pointer {
                write!(f, "{} ", qualifier)?;
            }
        }
        write!(f, "{}", self.name)?;
        for extent in &self.rank {
            write!(f, "[{}]", extent)?;
        }
        Ok(())
    }
}
