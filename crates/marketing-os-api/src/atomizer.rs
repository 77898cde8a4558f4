//! Message atomizer: sentence-level split and recombination.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Atom {
    pub index: usize,
    pub text: String,
}

/// Split `text` into sentence atoms.
///
/// A sentence ends at `.`, `!` or `?` (runs such as `?!` or `...` stay with
/// the sentence) followed by whitespace or end of input. Whitespace inside an
/// atom is collapsed to single spaces; empty atoms are dropped.
#[must_use]
pub fn atomize(text: &str) -> Vec<Atom> {
    let mut atoms = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        while let Some(&next) = chars.peek() {
            if matches!(next, '.' | '!' | '?') {
                current.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if chars.peek().map_or(true, |next| next.is_whitespace()) {
            push_atom(&mut atoms, &current);
            current.clear();
        }
    }
    push_atom(&mut atoms, &current);
    atoms
}

fn push_atom(atoms: &mut Vec<Atom>, raw: &str) {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        atoms.push(Atom { index: atoms.len(), text });
    }
}

/// Join atoms back together with single spaces.
#[must_use]
pub fn recombine<'a, I>(atoms: I) -> String
where
    I: IntoIterator<Item = &'a Atom>,
{
    atoms.into_iter().map(|atom| atom.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Recombine only the atoms whose index is in `selected`, in original order.
#[must_use]
pub fn recombine_selected(atoms: &[Atom], selected: &[usize]) -> String {
    recombine(atoms.iter().filter(|atom| selected.contains(&atom.index)))
}
