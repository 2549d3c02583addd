//! Buffer acotado de filas capturadas con dos políticas de inserción.
//!
//! - Preview (`push_chronological`): FIFO, se agrega al final mientras haya
//!   lugar; una vez lleno no se modifica.
//! - Breakpoint (`push_most_recent`): la fila más reciente va al frente; con
//!   capacidad > 0 se descarta la más vieja (final) al exceder, con
//!   capacidad <= 0 se conserva exactamente una fila (la última).
//!
//! En ambos casos `len() <= max(capacity, 1)`.

use std::collections::VecDeque;

use crate::model::RowSnapshot;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBuffer {
    rows: VecDeque<RowSnapshot>,
}

impl RowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `true` si una inserción cronológica más ya no cabe.
    pub fn is_full(&self, capacity: i64) -> bool {
        capacity <= 0 || self.rows.len() as i64 >= capacity
    }

    /// Agrega al final si hay lugar. Devuelve `false` (sin tocar el buffer)
    /// si ya estaba lleno.
    pub fn push_chronological(&mut self, row: RowSnapshot, capacity: i64) -> bool {
        if self.is_full(capacity) {
            return false;
        }
        self.rows.push_back(row);
        true
    }

    pub fn push_most_recent(&mut self, row: RowSnapshot, capacity: i64) {
        if capacity > 0 {
            self.rows.push_front(row);
            self.rows.truncate(capacity as usize);
        } else {
            match self.rows.front_mut() {
                Some(slot) => *slot = row,
                None => self.rows.push_back(row),
            }
            self.rows.truncate(1);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowSnapshot> {
        self.rows.iter()
    }

    pub fn to_vec(&self) -> Vec<RowSnapshot> {
        self.rows.iter().cloned().collect()
    }
}
