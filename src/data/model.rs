use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Channel – the recognized measurement dimensions
// ---------------------------------------------------------------------------

/// A recognized cytometer channel. Selectors offer exactly this set, in
/// this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    FscH,
    SscH,
    Fl1H,
    Fl2H,
    Fl3H,
    Fl1A,
    Fl1W,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::FscH,
        Channel::SscH,
        Channel::Fl1H,
        Channel::Fl2H,
        Channel::Fl3H,
        Channel::Fl1A,
        Channel::Fl1W,
    ];

    /// Column name as written by the instrument.
    pub fn name(self) -> &'static str {
        match self {
            Channel::FscH => "FSC-H",
            Channel::SscH => "SSC-H",
            Channel::Fl1H => "FL1-H",
            Channel::Fl2H => "FL2-H",
            Channel::Fl3H => "FL3-H",
            Channel::Fl1A => "FL1-A",
            Channel::Fl1W => "FL1-W",
        }
    }

    pub fn from_name(name: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Axis / ChannelPair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// The two channels currently plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPair {
    pub x: Channel,
    pub y: Channel,
}

impl Default for ChannelPair {
    fn default() -> Self {
        Self {
            x: Channel::FscH,
            y: Channel::SscH,
        }
    }
}

impl ChannelPair {
    pub fn get(&self, axis: Axis) -> Channel {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn with(self, axis: Axis, channel: Channel) -> Self {
        match axis {
            Axis::X => Self { x: channel, ..self },
            Axis::Y => Self { y: channel, ..self },
        }
    }

    /// First usable pair for a dataset: the first two recognized channels it
    /// carries, or the only one twice. `None` when it has none of them.
    pub fn first_valid(dataset: &Dataset) -> Option<Self> {
        let mut present = Channel::ALL
            .into_iter()
            .filter(|c| dataset.has_channel(c.name()));
        let x = present.next()?;
        let y = present.next().unwrap_or(x);
        Some(Self { x, y })
    }
}

// ---------------------------------------------------------------------------
// Dataset – one loaded measurement table
// ---------------------------------------------------------------------------

/// A loaded measurement table, stored column-major. Every column has the
/// same length, so every row carries the same channel set.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: BTreeMap<String, Vec<f64>>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset from named columns. Fails with a description of the
    /// first column whose length disagrees with the others.
    pub fn from_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self, String> {
        let columns: BTreeMap<String, Vec<f64>> = columns.into_iter().collect();
        let mut rows = None;
        for (col, values) in &columns {
            match rows {
                None => rows = Some(values.len()),
                Some(n) if n != values.len() => {
                    return Err(format!(
                        "column '{col}' has {} values, expected {n}",
                        values.len()
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows: rows.unwrap_or(0),
        })
    }

    /// Source identifier (the file name inside the import directory).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows (events).
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(cols: &[(&str, Vec<f64>)]) -> Dataset {
        Dataset::from_columns(
            "t.csv",
            cols.iter().map(|(n, v)| (n.to_string(), v.clone())),
        )
        .unwrap()
    }

    #[test]
    fn test_channel_names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_name(channel.name()), Some(channel));
        }
        assert_eq!(Channel::from_name("Time"), None);
    }

    #[test]
    fn test_unequal_columns_rejected() {
        let err = Dataset::from_columns(
            "bad",
            vec![
                ("FSC-H".to_string(), vec![1.0, 2.0]),
                ("SSC-H".to_string(), vec![1.0]),
            ],
        )
        .unwrap_err();
        assert!(err.contains("SSC-H"));
    }

    #[test]
    fn test_column_access() {
        let ds = dataset(&[("FSC-H", vec![1.0, 2.0]), ("SSC-H", vec![3.0, 4.0])]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("SSC-H").unwrap(), &[3.0, 4.0]);
        assert_eq!(ds.channel_names().collect::<Vec<_>>(), vec!["FSC-H", "SSC-H"]);
        assert!(ds.column("FL1-H").is_none());
    }

    #[test]
    fn test_first_valid_pair() {
        let ds = dataset(&[("FL2-H", vec![1.0]), ("Time", vec![0.0]), ("SSC-H", vec![2.0])]);
        assert_eq!(
            ChannelPair::first_valid(&ds),
            Some(ChannelPair {
                x: Channel::SscH,
                y: Channel::Fl2H
            })
        );

        let single = dataset(&[("FSC-H", vec![1.0])]);
        assert_eq!(
            ChannelPair::first_valid(&single),
            Some(ChannelPair {
                x: Channel::FscH,
                y: Channel::FscH
            })
        );

        let none = dataset(&[("Time", vec![1.0])]);
        assert_eq!(ChannelPair::first_valid(&none), None);
    }

    #[test]
    fn test_pair_with_axis() {
        let pair = ChannelPair::default().with(Axis::Y, Channel::Fl1W);
        assert_eq!(pair.get(Axis::X), Channel::FscH);
        assert_eq!(pair.get(Axis::Y), Channel::Fl1W);
    }
}
