use trail::permutation::{inv_permute, permute, STATE_CELLS};
use trail::{assemble, ActivityLabel, BlockKind, Diagram, Mask, Parity, ResultBuilder, RoundConfig,
            Slot, Style, TrailError, Variant};

fn all_cells(diagram: &Diagram) -> impl Iterator<Item = trail::CellMark> + '_ {
    diagram.blocks()
        .iter()
        .flat_map(|b| b.slots())
        .flat_map(|(_, lanes)| lanes.iter())
        .flat_map(|lane| lane.iter().copied())
}

#[test]
fn all_zero_single_round_trail() {
    let config = RoundConfig::new(Variant::Qarma64, 1, 1, 2);
    let mut result = ResultBuilder::new(config).build();
    result.contradict.clear();

    let diagram = assemble(&result, config).unwrap();

    assert_eq!(diagram.forward_blocks().count(), 1);
    assert_eq!(diagram.backward_blocks().count(), 1);
    assert_eq!(diagram.total_rounds(), 4);
    assert!(all_cells(&diagram).all(|c| c.style == Style::White && !c.framed));

    let forward = diagram.forward_blocks().next().unwrap();
    assert_eq!(forward.kind(), BlockKind::Forward { first: true, last: true });
    assert!(forward.slot(Slot::BeforeSbox).is_none());
    assert!(forward.slot(Slot::Handoff).is_some());
}

#[test]
fn lazy_cell_is_framed_in_the_matching_instance_only() {
    let config = RoundConfig::new(Variant::Qarma128, 2, 1, 3);
    let mut builder = ResultBuilder::new(config).lazy(Parity::Even, 3);
    for mask in [Mask::ForwardX, Mask::ForwardSbx, Mask::ForwardExx].iter() {
        builder = builder.label(*mask, 0, 0, 3, ActivityLabel::NonzeroFixed);
    }
    let result = builder.build();

    let diagram = assemble(&result, config).unwrap();
    let round0 = diagram.forward_blocks().next().unwrap();
    assert_eq!(round0.round(), Some(0));

    let first = round0.lane(Slot::Subtweakey, 0).unwrap();
    assert_eq!(first[3].style, Style::NonzeroFixed);
    assert!(first[3].framed);

    let second = round0.lane(Slot::Subtweakey, 1).unwrap();
    assert_eq!(second[3].style, Style::White);
    assert!(!second[3].framed);
    assert_eq!(round0.tweak_cells(1).unwrap()[3], 19);
}

#[test]
fn out_of_domain_label_yields_no_diagram() {
    let config = RoundConfig::new(Variant::Qarma64, 2, 2, 4);
    let result = ResultBuilder::new(config)
        .raw(Mask::BackwardSbx, 1, 0, 12, 7)
        .build();

    match assemble(&result, config) {
        Err(TrailError::MalformedResult { path, .. }) => assert_eq!(path, "backward_mask_sbx[1][0][12]"),
        other => panic!("expected a malformed result, got {:?}", other),
    }
}

#[test]
fn round_counts_are_checked_before_anything_is_drawn() {
    let config = RoundConfig::new(Variant::Qarma64, 2, 2, 4);
    let result = ResultBuilder::new(config).build();

    let err = assemble(&result, RoundConfig::new(Variant::Qarma64, 3, 2, 4)).unwrap_err();
    assert_eq!(err.kind(), "ConfigurationMismatch");
}

#[test]
fn single_backward_round_carries_the_terminal_state() {
    let config = RoundConfig::new(Variant::Qarma64, 2, 1, 4);
    let result = ResultBuilder::new(config)
        .label(Mask::ForwardX, 2, 0, 6, ActivityLabel::NonzeroAny)
        .label(Mask::BackwardX, 0, 0, 6, ActivityLabel::NonzeroAny)
        .build();

    let diagram = assemble(&result, config).unwrap();
    let backward: Vec<_> = diagram.backward_blocks().collect();
    assert_eq!(backward.len(), 1);
    assert_eq!(backward[0].kind(), BlockKind::Backward { last: true });
    assert_eq!(backward[0].slot(Slot::BeforeInvSbox), backward[0].slot(Slot::Terminal));
    assert_eq!(backward[0].lane(Slot::Terminal, 0).unwrap()[6].style, Style::NonzeroAny);
}

#[test]
fn handoff_is_shared_between_both_trails() {
    let config = RoundConfig::new(Variant::Qarma128, 2, 2, 4);
    let result = ResultBuilder::new(config)
        .label(Mask::ForwardX, 2, 1, 5, ActivityLabel::NonzeroAny)
        .label(Mask::BackwardX, 1, 1, 5, ActivityLabel::NonzeroAny)
        .build();

    let diagram = assemble(&result, config).unwrap();
    let last_forward = diagram.forward_blocks().last().unwrap();
    let first_backward = diagram.backward_blocks().next().unwrap();

    assert_eq!(last_forward.kind(), BlockKind::Forward { first: false, last: true });
    assert_eq!(last_forward.slot(Slot::Handoff), last_forward.slot(Slot::AfterDiffusion));
    assert_eq!(last_forward.slot(Slot::Handoff), first_backward.slot(Slot::BeforeInvSbox));
    assert_eq!(first_backward.lane(Slot::BeforeInvSbox, 1).unwrap()[5].style, Style::NonzeroAny);
}

#[test]
fn disagreeing_handoff_yields_no_diagram() {
    let config = RoundConfig::new(Variant::Qarma64, 2, 2, 4);
    let result = ResultBuilder::new(config)
        .label(Mask::ForwardX, 2, 0, 5, ActivityLabel::NonzeroAny)
        .build();

    match assemble(&result, config) {
        Err(TrailError::MalformedResult { path, .. }) => assert_eq!(path, "forward_mask_x[2][0][5]"),
        other => panic!("expected a malformed result, got {:?}", other),
    }
}

#[test]
fn rendering_twice_gives_the_same_diagram() {
    let config = RoundConfig::new(Variant::Qarma128, 3, 2, 6);
    let result = ResultBuilder::new(config)
        .lazy(Parity::Odd, 14)
        .fill(Mask::ForwardSbx, ActivityLabel::Unknown)
        .label(Mask::BackwardExx, 0, 1, 2, ActivityLabel::NonzeroFixed)
        .build();

    assert_eq!(assemble(&result, config), assemble(&result, config));
}

#[test]
fn framing_follows_the_absolute_round_parity() {
    let config = RoundConfig::new(Variant::Qarma128, 2, 2, 4);
    // Both instances see the same tweak cells, but carry different labels.
    let shared: Vec<u8> = (0..16).chain(0..16).collect();
    let mut builder = ResultBuilder::new(config)
        .lazy(Parity::Even, 2)
        .lazy(Parity::Odd, 7)
        .fill(Mask::ForwardExx, ActivityLabel::NonzeroAny)
        .label(Mask::BackwardSbx, 0, 0, 7, ActivityLabel::Unknown);
    for r in 0..config.tweak_rounds_needed() {
        builder = builder.tweak_permutation(r, shared.clone());
    }
    let result = builder.build();

    let diagram = assemble(&result, config).unwrap();
    let forward: Vec<_> = diagram.forward_blocks().collect();
    let backward: Vec<_> = diagram.backward_blocks().collect();

    assert_eq!(forward[0].framed_cells(0), vec![2]);
    assert_eq!(forward[1].framed_cells(0), vec![7]);
    // Backward round 0 is absolute round RU = 2.
    assert_eq!(backward[0].parity(), Some(Parity::Even));
    assert_eq!(backward[0].framed_cells(0), vec![2]);
    assert_eq!(backward[1].framed_cells(0), vec![7]);

    for block in forward.iter().chain(backward.iter()) {
        assert_eq!(block.framed_cells(0), block.framed_cells(1));
    }
}

#[test]
fn cell_permutation_round_trips() {
    for j in 0..STATE_CELLS {
        assert_eq!(inv_permute(permute(j).unwrap()).unwrap(), j);
        assert_eq!(permute(inv_permute(j).unwrap()).unwrap(), j);
    }
    assert!(permute(STATE_CELLS).is_err());
}

#[test]
fn summary_closes_the_diagram() {
    let config = RoundConfig::new(Variant::Qarma64, 2, 3, 4);
    let result = ResultBuilder::new(config).lazy(Parity::Even, 0).build();

    let diagram = assemble(&result, config).unwrap();
    let last = diagram.blocks().last().unwrap();
    assert_eq!(last.kind(), BlockKind::Summary);
    assert!(diagram.summary().unwrap().contains("T0[00]"));
    assert_eq!(diagram.blocks().len(), 1 + 2 + 3 + 1);
}
