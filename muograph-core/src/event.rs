//! Event records and detector sessions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One scintillator-bar readout: bar index and muon path length through it.
///
/// Bar indices are `100 * plane + slot` with plane 1..=4 and slot counted
/// across the plane, matching the raw detector numbering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarHit {
    /// Raw bar index.
    pub bar: u16,
    /// Path length through the bar, in centimeters.
    pub path_length: f64,
}

impl BarHit {
    /// Creates a new bar readout.
    #[inline]
    pub fn new(bar: u16, path_length: f64) -> Self {
        Self { bar, path_length }
    }

    /// Detector plane of this bar (0-based), or `None` for an index outside
    /// the four planes.
    #[inline]
    pub fn plane(&self) -> Option<usize> {
        match self.bar / 100 {
            p @ 1..=4 => Some(p as usize - 1),
            _ => None,
        }
    }
}

/// One particle crossing: every bar readout it produced, in readout order.
///
/// Immutable after ingestion; the external log parser supplies these.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventRecord {
    /// Bar readouts for this crossing.
    pub hits: Vec<BarHit>,
}

impl EventRecord {
    /// Creates an event from its bar readouts.
    pub fn new(hits: Vec<BarHit>) -> Self {
        Self { hits }
    }

    /// Returns true if the event has no readouts.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl FromIterator<BarHit> for EventRecord {
    fn from_iter<I: IntoIterator<Item = BarHit>>(iter: I) -> Self {
        Self {
            hits: iter.into_iter().collect(),
        }
    }
}

/// An ordered run of events from one detector position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorSession {
    events: Vec<EventRecord>,
    position: [f64; 2],
    plane_separation: f64,
}

impl DetectorSession {
    /// Creates a session from its events, 2D detector position, and plane
    /// separation (all lengths in centimeters).
    pub fn new(events: Vec<EventRecord>, position: [f64; 2], plane_separation: f64) -> Self {
        Self {
            events,
            position,
            plane_separation,
        }
    }

    /// All recorded events, including the truncated trailing record.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Events usable for reconstruction.
    ///
    /// The final record of every readout file is cut short by the DAQ and is
    /// excluded from every event walk.
    pub fn valid_events(&self) -> &[EventRecord] {
        match self.events.len() {
            0 => &[],
            n => &self.events[..n - 1],
        }
    }

    /// 2D detector position of this viewpoint.
    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    /// Separation between the upper and lower plane pairs.
    pub fn plane_separation(&self) -> f64 {
        self.plane_separation
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the session has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_plane() {
        assert_eq!(BarHit::new(101, 1.0).plane(), Some(0));
        assert_eq!(BarHit::new(227, 1.0).plane(), Some(1));
        assert_eq!(BarHit::new(404, 1.0).plane(), Some(3));
        assert_eq!(BarHit::new(501, 1.0).plane(), None);
        assert_eq!(BarHit::new(13, 1.0).plane(), None);
    }

    #[test]
    fn test_valid_events_drops_trailing_record() {
        let events = vec![EventRecord::default(); 4];
        let session = DetectorSession::new(events, [500.0, -500.0], 25.0);
        assert_eq!(session.len(), 4);
        assert_eq!(session.valid_events().len(), 3);
    }

    #[test]
    fn test_valid_events_empty_session() {
        let session = DetectorSession::new(Vec::new(), [0.0, 0.0], 25.0);
        assert!(session.valid_events().is_empty());
    }
}
