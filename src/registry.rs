//! Logical roles for the elements the effect system addresses.
//!
//! Instead of loose selector queries scattered through the adapters, every
//! addressable element is captured once at initialization under a [`Role`].
//! Adapters ask the registry for a role's targets; an empty role answers
//! `TargetNotFound`, which callers absorb by skipping the effect.

use std::collections::HashMap;

use crate::sequencer::{EffectError, EffectTarget};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Role {
    /// Hero pieces that stagger in on page load.
    HeroPiece,
    /// Sections revealed when they intersect the viewport.
    RevealSection,
    /// Children staggered in after their section reveals.
    RevealChild,
    Navbar,
    NavMenu,
    NavLink,
    Hamburger,
    /// `section[id]` blocks driving the active-link highlight.
    PageSection,
    /// Cards that lift on hover.
    Card,
    /// Elements that follow the cursor while hovered.
    Magnetic,
    FormField,
    /// In-page anchors that smooth-scroll.
    AnchorLink,
    Parallax,
    ThemeToggle,
}

impl Role {
    pub const ALL: [Role; 14] = [
        Role::HeroPiece,
        Role::RevealSection,
        Role::RevealChild,
        Role::Navbar,
        Role::NavMenu,
        Role::NavLink,
        Role::Hamburger,
        Role::PageSection,
        Role::Card,
        Role::Magnetic,
        Role::FormField,
        Role::AnchorLink,
        Role::Parallax,
        Role::ThemeToggle,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            Role::HeroPiece => {
                ".hero-title, .hero-subtitle, .hero-description, .hero-buttons, .hero-image"
            }
            Role::RevealSection => {
                ".about-content, .skills-grid, .projects-grid, .contact-content"
            }
            Role::RevealChild => {
                ".stat, .skill-category, .project-card, .contact-method, .social-link, .skill-item"
            }
            Role::Navbar => ".navbar",
            Role::NavMenu => ".nav-menu",
            Role::NavLink => ".nav-link",
            Role::Hamburger => ".hamburger",
            Role::PageSection => "section[id]",
            Role::Card => ".project-card, .skill-category, .stat",
            Role::Magnetic => ".magnetic",
            Role::FormField => "input, textarea",
            Role::AnchorLink => "a[href^='#']",
            Role::Parallax => ".parallax",
            Role::ThemeToggle => ".theme-toggle",
        }
    }
}

/// Role → element-handle sets, populated once at DOM-ready.
pub struct Registry<T> {
    targets: HashMap<Role, Vec<T>>,
}

impl<T: EffectTarget> Registry<T> {
    pub fn new() -> Self {
        Self {
            targets: HashMap::new(),
        }
    }

    pub fn register(&mut self, role: Role, target: T) {
        self.targets.entry(role).or_default().push(target);
    }

    /// Targets registered under `role`, in registration (document) order.
    pub fn targets(&self, role: Role) -> Result<&[T], EffectError> {
        match self.targets.get(&role) {
            Some(targets) if !targets.is_empty() => Ok(targets),
            _ => Err(EffectError::TargetNotFound),
        }
    }

    pub fn first(&self, role: Role) -> Result<&T, EffectError> {
        self.targets(role).map(|targets| &targets[0])
    }
}

impl<T: EffectTarget> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
