use std::fmt;

/// Where an element of one shell lies relative to another shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Strictly inside.
    Inside,
    /// Strictly outside.
    Outside,
    /// On the boundary, with matching orientation.
    OnShared,
    /// On the boundary, with opposing orientation.
    OnAnti,
}

impl Classification {
    /// Returns `true` for either of the boundary classifications.
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::OnShared | Self::OnAnti)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inside => "inside",
            Self::Outside => "outside",
            Self::OnShared => "on-shared",
            Self::OnAnti => "on-anti",
        };
        f.write_str(name)
    }
}
