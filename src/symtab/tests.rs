use super::*;

#[test]
fn resolves_innermost_first() {
    let mut chain = ScopeChain::new();
    chain
        .define(Symbol::Variable {
            name: "x".into(),
            level: 0,
            index: 0,
        })
        .unwrap();

    chain.open_scope();
    chain
        .define(Symbol::Variable {
            name: "x".into(),
            level: 1,
            index: 0,
        })
        .unwrap();

    match chain.resolve("x").unwrap() {
        Symbol::Variable { level, .. } => assert_eq!(*level, 1),
        _ => panic!("expected a variable"),
    }

    chain.close_scope();
    match chain.resolve("x").unwrap() {
        Symbol::Variable { level, .. } => assert_eq!(*level, 0),
        _ => panic!("expected a variable"),
    }
}

#[test]
fn duplicate_definition_in_same_scope_is_rejected() {
    let mut chain = ScopeChain::new();
    chain
        .define(Symbol::Constant {
            name: "a".into(),
            value: 1,
        })
        .unwrap();
    let err = chain
        .define(Symbol::Variable {
            name: "a".into(),
            level: 0,
            index: 0,
        })
        .unwrap_err();
    assert_eq!(err, DefineError::DuplicateSymbol);
}

#[test]
fn shadowing_in_a_nested_scope_is_allowed() {
    let mut chain = ScopeChain::new();
    chain
        .define(Symbol::Variable {
            name: "a".into(),
            level: 0,
            index: 0,
        })
        .unwrap();
    chain.open_scope();
    chain
        .define(Symbol::Variable {
            name: "a".into(),
            level: 1,
            index: 0,
        })
        .unwrap();
}

#[test]
fn variable_indices_are_assigned_in_declaration_order() {
    let mut chain = ScopeChain::new();
    chain
        .define(Symbol::Variable {
            name: "a".into(),
            level: 0,
            index: 0,
        })
        .unwrap();
    chain
        .define(Symbol::Variable {
            name: "b".into(),
            level: 0,
            index: 0,
        })
        .unwrap();

    match chain.resolve("a").unwrap() {
        Symbol::Variable { index, .. } => assert_eq!(*index, 0),
        _ => panic!(),
    }
    match chain.resolve("b").unwrap() {
        Symbol::Variable { index, .. } => assert_eq!(*index, 1),
        _ => panic!(),
    }
    assert_eq!(chain.current_var_count(), 2);
}

#[test]
fn level_delta_across_three_nested_scopes() {
    let mut chain = ScopeChain::new();
    chain
        .define(Symbol::Variable {
            name: "g".into(),
            level: 0,
            index: 0,
        })
        .unwrap();

    chain.open_scope();
    chain
        .define(Symbol::Procedure {
            name: "p".into(),
            level: 1,
            entry: None,
        })
        .unwrap();
    chain
        .define(Symbol::Variable {
            name: "m".into(),
            level: 1,
            index: 0,
        })
        .unwrap();

    chain.open_scope();
    chain
        .define(Symbol::Variable {
            name: "l".into(),
            level: 2,
            index: 0,
        })
        .unwrap();

    // level-delta = caller_level(2) - definition_level
    assert_eq!(chain.resolve("l").unwrap().level(), 2);
    assert_eq!(chain.resolve("m").unwrap().level(), 1);
    assert_eq!(chain.resolve("g").unwrap().level(), 0);
    assert_eq!(chain.current_level(), 2);

    chain.close_scope();
    chain.close_scope();
    assert_eq!(chain.current_level(), 0);
}

#[test]
fn set_procedure_entry_is_visible_after_the_fact() {
    let mut chain = ScopeChain::new();
    chain
        .define(Symbol::Procedure {
            name: "p".into(),
            level: 0,
            entry: None,
        })
        .unwrap();
    match chain.resolve("p").unwrap() {
        Symbol::Procedure { entry, .. } => assert_eq!(*entry, None),
        _ => panic!(),
    }
    chain.set_procedure_entry("p", 42);
    match chain.resolve("p").unwrap() {
        Symbol::Procedure { entry, .. } => assert_eq!(*entry, Some(42)),
        _ => panic!(),
    }
}
