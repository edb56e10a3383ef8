//! Borrowed views of field storage handed to per-step computations.

use crate::field::FieldTemporal;

/// The storage of one field for the duration of one call.
///
/// A stateless field is a single buffer read and written in place. A
/// stateful field pairs the converged step `N`, read-only, with the step
/// being computed `N+1`.
#[derive(Debug)]
pub enum FieldView<'a> {
    /// The single buffer of a stateless field.
    Stateless(&'a mut [f64]),
    /// Both snapshots of a stateful field.
    Stateful {
        /// Last converged step.
        n: &'a [f64],
        /// Step being computed.
        np1: &'a mut [f64],
    },
}

impl<'a> FieldView<'a> {
    /// Temporal class of the viewed field.
    pub fn temporal(&self) -> FieldTemporal {
        match self {
            Self::Stateless(_) => FieldTemporal::Stateless,
            Self::Stateful { .. } => FieldTemporal::Stateful,
        }
    }

    /// Length of the buffer being computed.
    pub fn len(&self) -> usize {
        self.current().len()
    }

    /// Whether the buffer being computed is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at the last converged step; the single buffer if stateless.
    pub fn previous(&self) -> &[f64] {
        match self {
            Self::Stateless(buf) => buf,
            Self::Stateful { n, .. } => n,
        }
    }

    /// Value being computed.
    pub fn current(&self) -> &[f64] {
        match self {
            Self::Stateless(buf) => buf,
            Self::Stateful { np1, .. } => np1,
        }
    }

    /// Mutable value being computed.
    pub fn current_mut(&mut self) -> &mut [f64] {
        match self {
            Self::Stateless(buf) => buf,
            Self::Stateful { np1, .. } => np1,
        }
    }

    /// `(N, N+1)` of a stateful field; `None` if the field is stateless.
    pub fn split_mut(&mut self) -> Option<(&[f64], &mut [f64])> {
        match self {
            Self::Stateless(_) => None,
            Self::Stateful { n, np1 } => Some((n, np1)),
        }
    }

    /// Give up the view, keeping the buffer being computed.
    pub fn into_current(self) -> &'a mut [f64] {
        match self {
            Self::Stateless(buf) => buf,
            Self::Stateful { np1, .. } => np1,
        }
    }
}
