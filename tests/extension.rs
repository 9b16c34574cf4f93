mod common;

use std::any::Any;

use assayframe::prelude::*;
use common::{
    named_frame,
    slotted_frame,
    NCOLS,
    NROWS,
};
use indexmap::IndexMap;

/// Groups of row positions kept as a membership map. Follows the rows
/// the same way the built-in payloads do: subsetting remaps members to
/// their new positions, binding offsets the members of later parts.
#[derive(Clone, Debug, PartialEq)]
struct RowGroups {
    nrows:  usize,
    groups: IndexMap<String, Vec<usize>>,
}

impl RowGroups {
    fn new(
        nrows: usize,
        groups: IndexMap<String, Vec<usize>>,
    ) -> Self {
        RowGroups { nrows, groups }
    }

    fn members(
        &self,
        group: &str,
    ) -> &[usize] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ExtensionSlot for RowGroups {
    fn role(&self) -> SlotRole {
        SlotRole::Vector(AxisLink::Rows)
    }

    fn validate(
        &self,
        nrows: usize,
        _ncols: usize,
    ) -> Vec<String> {
        let mut violations = Vec::new();
        if self.nrows != nrows {
            violations.push(format!(
                "row groups cover {} positions, expected {}",
                self.nrows, nrows
            ));
        }
        for (name, members) in &self.groups {
            if members.iter().any(|&pos| pos >= self.nrows) {
                violations.push(format!(
                    "group '{}' references positions past the rows",
                    name
                ));
            }
        }
        violations
    }

    fn subset(
        &self,
        rows: &[usize],
        _cols: &[usize],
    ) -> Box<dyn ExtensionSlot> {
        let mut new_positions: Vec<Vec<usize>> = vec![Vec::new(); self.nrows];
        for (new_pos, &old_pos) in rows.iter().enumerate() {
            new_positions[old_pos].push(new_pos);
        }
        let groups = self
            .groups
            .iter()
            .map(|(name, members)| {
                let members = members
                    .iter()
                    .flat_map(|&pos| new_positions[pos].iter().copied())
                    .collect();
                (name.clone(), members)
            })
            .collect();
        Box::new(RowGroups::new(rows.len(), groups))
    }

    fn assign(
        &mut self,
        rows: &[usize],
        _cols: &[usize],
        src: &dyn ExtensionSlot,
    ) -> Result<()> {
        let src = downcast_slot::<Self>(src)?;
        for (name, members) in self.groups.iter_mut() {
            members.retain(|pos| !rows.contains(pos));
            if let Some(src_members) = src.groups.get(name) {
                members.extend(src_members.iter().map(|&pos| rows[pos]));
            }
        }
        Ok(())
    }

    fn bind(
        &self,
        others: &[&dyn ExtensionSlot],
        axis: Axis,
    ) -> Result<Box<dyn ExtensionSlot>> {
        if axis != Axis::Rows {
            return Ok(self.boxed_clone());
        }
        let mut bound = self.clone();
        for other in others {
            let other = downcast_slot::<Self>(*other)?;
            let offset = bound.nrows;
            for (name, members) in &other.groups {
                bound
                    .groups
                    .entry(name.clone())
                    .or_default()
                    .extend(members.iter().map(|&pos| pos + offset));
            }
            bound.nrows += other.nrows;
        }
        Ok(Box::new(bound))
    }

    fn content_eq(
        &self,
        other: &dyn ExtensionSlot,
    ) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn boxed_clone(&self) -> Box<dyn ExtensionSlot> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn demo_groups() -> RowGroups {
    let mut groups = IndexMap::new();
    groups.insert("coding".to_string(), vec![0, 1, 2, 3, 4]);
    groups.insert("marked".to_string(), vec![2, 8]);
    RowGroups::new(NROWS, groups)
}

#[test]
fn test_roles_describe_linkage() -> anyhow::Result<()> {
    let frame = slotted_frame();
    assert_eq!(frame.slot_names(), vec!["pca", "sizes", "neighbors"]);
    assert_eq!(
        frame.slot("pca")?.role(),
        SlotRole::Matrix(AxisLink::Cols, AxisLink::Free)
    );
    assert_eq!(frame.slot("sizes")?.role(), SlotRole::Vector(AxisLink::Cols));
    assert_eq!(
        frame.slot("neighbors")?.role(),
        SlotRole::Matrix(AxisLink::Rows, AxisLink::Rows)
    );
    Ok(())
}

#[test]
fn test_custom_slot_travels_with_subsetting() -> anyhow::Result<()> {
    let mut frame = named_frame();
    frame.set_slot("groups", demo_groups())?;
    let picked = frame.subset(vec![8, 2, 0], ..)?;
    let groups = picked.slot_downcast::<RowGroups>("groups")?;
    assert_eq!(groups.members("coding"), &[2, 1]);
    assert_eq!(groups.members("marked"), &[1, 0]);
    Ok(())
}

#[test]
fn test_custom_slot_rebuilds_after_split() -> anyhow::Result<()> {
    let mut frame = named_frame();
    frame.set_slot("groups", demo_groups())?;
    let top = frame.subset(0..5, ..)?;
    let bottom = frame.subset(5..NROWS, ..)?;
    let rebuilt = top.bind_rows(&[&bottom])?;
    let groups = rebuilt.slot_downcast::<RowGroups>("groups")?;
    assert_eq!(groups.members("coding"), &[0, 1, 2, 3, 4]);
    assert_eq!(groups.members("marked"), &[2, 8]);
    assert_eq!(rebuilt, frame);
    Ok(())
}

#[test]
fn test_custom_slot_follows_assignment() -> anyhow::Result<()> {
    let mut frame = named_frame();
    frame.set_slot("groups", demo_groups())?;
    let mut patch = frame.subset(vec![2, 3], ..)?;
    let mut replacement = IndexMap::new();
    replacement.insert("coding".to_string(), vec![1]);
    replacement.insert("marked".to_string(), vec![0, 1]);
    patch.set_slot("groups", RowGroups::new(2, replacement))?;

    frame.assign_subset(vec![2, 3], .., &patch)?;
    let groups = frame.slot_downcast::<RowGroups>("groups")?;
    assert_eq!(groups.members("coding"), &[0, 1, 4, 3]);
    assert_eq!(groups.members("marked"), &[8, 2, 3]);
    Ok(())
}

#[test]
fn test_custom_slot_guards_insertion() {
    let mut frame = named_frame();
    let mut groups = IndexMap::new();
    groups.insert("broken".to_string(), vec![0, 99]);
    let err = frame
        .set_slot("groups", RowGroups::new(NROWS, groups))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "container state is invalid: slot 'groups': group 'broken' \
         references positions past the rows"
    );
}

#[test]
fn test_downcast_type_mismatch() {
    let frame = slotted_frame();
    let err = frame.slot_downcast::<AxisVector<u32>>("pca").unwrap_err();
    assert_eq!(err.to_string(), "slot types are not compatible");
}

#[test]
fn test_remove_slot_returns_payload() -> anyhow::Result<()> {
    let mut frame = slotted_frame();
    let removed = frame.remove_slot("sizes")?;
    let sizes = downcast_slot::<AxisVector<u32>>(removed.as_ref())?;
    assert_eq!(sizes.values().len(), NCOLS);
    assert_eq!(frame.n_slots(), 2);
    let err = frame.slot("sizes").unwrap_err();
    assert_eq!(err.to_string(), "slot 'sizes' not found");
    Ok(())
}
