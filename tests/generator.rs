use hexput_blockly_core::block::BlockKind;
use hexput_blockly_core::error::GenerateError;
use hexput_blockly_core::workspace::{BlockId, Workspace};
use hexput_blockly_core::{Code, HexputGenerator};

fn number(ws: &mut Workspace, value: &str) -> BlockId {
    let id = ws.add_block(BlockKind::NumberLiteral);
    ws.set_field(id, "NUM", value);
    id
}

fn var(ws: &mut Workspace, name: &str) -> BlockId {
    let id = ws.add_block(BlockKind::VariableReference);
    ws.set_field(id, "VAR_NAME", name);
    id
}

fn string(ws: &mut Workspace, text: &str) -> BlockId {
    let id = ws.add_block(BlockKind::StringLiteral);
    ws.set_field(id, "TEXT", text);
    id
}

fn binary(ws: &mut Workspace, kind: BlockKind, a: BlockId, b: BlockId) -> BlockId {
    let id = ws.add_block(kind);
    ws.connect_input(id, "A", a);
    ws.connect_input(id, "B", b);
    id
}

fn render(ws: &Workspace, id: BlockId) -> String {
    let generator = HexputGenerator::new();
    let mut pass = generator.pass(ws);
    pass.block_to_code(id, false).unwrap().into_text()
}

fn generate(ws: &Workspace) -> String {
    HexputGenerator::new().workspace_to_code(ws).unwrap()
}

#[test]
fn statements_keep_their_terminators_with_empty_sockets() {
    let mut ws = Workspace::new();
    let decl = ws.add_block(BlockKind::VariableDeclaration);
    ws.set_field(decl, "VAR_NAME", "x");
    let ret = ws.add_block(BlockKind::ReturnStatement);
    let cond = ws.add_block(BlockKind::IfStatement);
    let lp = ws.add_block(BlockKind::LoopStatement);
    ws.set_field(lp, "ITER_VAR", "item");

    assert_eq!(render(&ws, decl), "vl x = \"\";\n");
    assert_eq!(render(&ws, ret), "res null;\n");
    assert_eq!(render(&ws, cond), "if true {\n}\n");
    assert_eq!(render(&ws, lp), "loop item in [] {\n}\n");
}

#[test]
fn binary_operators_fall_back_to_placeholders() {
    let cases = [
        (BlockKind::AnyConcat, "\"\" + \"\""),
        (BlockKind::MathSubtract, "0 - 0"),
        (BlockKind::MathMultiply, "0 * 0"),
        (BlockKind::MathDivide, "0 / 0"),
        (BlockKind::LogicAnd, "true && true"),
        (BlockKind::LogicOr, "false || false"),
        (BlockKind::ComparisonGt, "0 > 0"),
        (BlockKind::ComparisonLt, "0 < 0"),
        (BlockKind::ComparisonEq, "0 == 0"),
        (BlockKind::ComparisonNeq, "0 != 0"),
        (BlockKind::ComparisonGte, "0 >= 0"),
        (BlockKind::ComparisonLte, "0 <= 0"),
        (BlockKind::LogicNot, "!(true)"),
    ];
    for (kind, expected) in cases {
        let mut ws = Workspace::new();
        let id = ws.add_block(kind.clone());
        assert_eq!(render(&ws, id), expected, "{}", kind);
    }
}

#[test]
fn accessors_fall_back_to_placeholders() {
    let mut ws = Workspace::new();
    let dot = ws.add_block(BlockKind::ObjectPropertyAccess);
    ws.set_field(dot, "PROPERTY", "name");
    let bracket = ws.add_block(BlockKind::ObjectBracketAccess);
    let index = ws.add_block(BlockKind::ArrayIndexAccess);

    assert_eq!(render(&ws, dot), "null.name");
    assert_eq!(render(&ws, bracket), "null[\"property\"]");
    assert_eq!(render(&ws, index), "[][0]");
}

#[test]
fn accessors_render_connected_operands() {
    let mut ws = Workspace::new();
    let user = var(&mut ws, "user");
    let key = string(&mut ws, "age");
    let bracket = ws.add_block(BlockKind::ObjectBracketAccess);
    ws.connect_input(bracket, "OBJECT", user);
    ws.connect_input(bracket, "PROPERTY", key);

    let items = var(&mut ws, "items");
    let i = var(&mut ws, "i");
    let one = number(&mut ws, "1");
    let sum = binary(&mut ws, BlockKind::AnyConcat, i, one);
    let index = ws.add_block(BlockKind::ArrayIndexAccess);
    ws.connect_input(index, "ARRAY", items);
    ws.connect_input(index, "INDEX", sum);

    assert_eq!(render(&ws, bracket), "user[\"age\"]");
    assert_eq!(render(&ws, index), "items[i + 1]");
}

#[test]
fn function_call_with_string_callee_and_no_params() {
    let mut ws = Workspace::new();
    let callee = string(&mut ws, "foo");
    let call = ws.add_block(BlockKind::FunctionCall);
    ws.connect_input(call, "FUNCTION_NAME", callee);

    assert_eq!(render(&ws, call), "foo()");
}

#[test]
fn function_call_without_callee_uses_placeholder() {
    let mut ws = Workspace::new();
    let call = ws.add_block(BlockKind::FunctionCall);
    assert_eq!(render(&ws, call), "undefined()");
}

fn call_with_params(ws: &mut Workspace, name: &str, args: &[BlockId]) -> (BlockId, BlockId) {
    let callee = string(ws, name);
    let call = ws.add_block(BlockKind::FunctionCall);
    ws.connect_input(call, "FUNCTION_NAME", callee);
    let params = ws.add_block(BlockKind::FunctionParams);
    ws.connect_next(call, params);

    let mut previous: Option<BlockId> = None;
    for arg in args {
        let param = ws.add_block(BlockKind::FunctionParameter);
        ws.connect_input(param, "PARAM_VALUE", *arg);
        match previous {
            Some(prev) => ws.connect_next(prev, param),
            None => ws.connect_input(params, "PARAMS", param),
        }
        previous = Some(param);
    }
    (call, params)
}

#[test]
fn function_call_renders_its_chained_params_once() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let (call, params) = call_with_params(&mut ws, "foo", &[one]);

    let generator = HexputGenerator::new();
    let mut pass = generator.pass(&ws);
    assert_eq!(pass.block_to_code(call, true).unwrap().text(), "foo(1)");
    // The call consumed its params block; the next render of it is empty.
    assert_eq!(pass.block_to_code(params, true).unwrap(), Code::Stmt(String::new()));
    assert_eq!(pass.block_to_code(params, true).unwrap().text(), "1");
}

#[test]
fn function_call_inside_a_statement_is_not_emitted_twice() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let name = string(&mut ws, "a");
    let (call, _) = call_with_params(&mut ws, "foo", &[one, name]);
    let decl = ws.add_top_block(BlockKind::VariableDeclaration, 0.0, 0.0);
    ws.set_field(decl, "VAR_NAME", "r");
    ws.connect_input(decl, "VALUE", call);

    assert_eq!(generate(&ws), "vl r = foo(1, \"a\");\n");
    // A second pass starts with nothing consumed.
    assert_eq!(generate(&ws), "vl r = foo(1, \"a\");\n");
}

#[test]
fn parenthesized_callee_is_unwrapped() {
    let mut ws = Workspace::new();
    let obj = var(&mut ws, "obj");
    let method = ws.add_block(BlockKind::ObjectPropertyAccess);
    ws.connect_input(method, "OBJECT", obj);
    ws.set_field(method, "PROPERTY", "run");
    let a = var(&mut ws, "a");
    let b = var(&mut ws, "b");
    let sum = binary(&mut ws, BlockKind::AnyConcat, a, b);
    let call = ws.add_block(BlockKind::FunctionCall);
    ws.connect_input(call, "FUNCTION_NAME", sum);
    let call2 = ws.add_block(BlockKind::FunctionCall);
    ws.connect_input(call2, "FUNCTION_NAME", method);

    assert_eq!(render(&ws, call), "a + b()");
    assert_eq!(render(&ws, call2), "obj.run()");
}

#[test]
fn nested_call_arguments_keep_their_commas() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let two = number(&mut ws, "2");
    let (inner, _) = call_with_params(&mut ws, "max", &[one, two]);
    let (outer, _) = call_with_params(&mut ws, "print", &[inner]);

    assert_eq!(render(&ws, outer), "print(max(1, 2))");
}

fn array(ws: &mut Workspace, values: &[BlockId]) -> BlockId {
    let list = ws.add_block(BlockKind::ArrayLiteral);
    let mut previous: Option<BlockId> = None;
    for value in values {
        let item = ws.add_block(BlockKind::ArrayItem);
        ws.connect_input(item, "VALUE", *value);
        match previous {
            Some(prev) => ws.connect_next(prev, item),
            None => ws.connect_input(list, "ITEMS", item),
        }
        previous = Some(item);
    }
    list
}

#[test]
fn array_literal_joins_its_items() {
    let mut ws = Workspace::new();
    let values = ["1", "2", "3"]
        .iter()
        .map(|v| number(&mut ws, v))
        .collect::<Vec<_>>();
    let list = array(&mut ws, &values);
    let empty = array(&mut ws, &[]);

    assert_eq!(render(&ws, list), "[1, 2, 3]");
    assert_eq!(render(&ws, empty), "[]");
}

#[test]
fn nested_arrays_and_empty_items() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let two = number(&mut ws, "2");
    let inner = array(&mut ws, &[one, two]);
    let outer = array(&mut ws, &[inner]);
    let hole = ws.add_block(BlockKind::ArrayItem);
    let items_head = ws.get(outer).unwrap().input("ITEMS").unwrap();
    ws.connect_next(items_head, hole);

    assert_eq!(render(&ws, outer), "[[1, 2], \"\"]");
}

#[test]
fn object_literal_keeps_trailing_separator() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let prop = ws.add_block(BlockKind::ObjectProperty);
    ws.set_field(prop, "PROP_NAME", "x");
    ws.connect_input(prop, "VALUE", one);
    let obj = ws.add_block(BlockKind::ObjectLiteral);
    ws.connect_input(obj, "PROPERTIES", prop);

    assert_eq!(render(&ws, obj), "{ x: 1, }");

    let two = number(&mut ws, "2");
    let second = ws.add_block(BlockKind::ObjectProperty);
    ws.set_field(second, "PROP_NAME", "y");
    ws.connect_input(second, "VALUE", two);
    ws.connect_next(prop, second);
    assert_eq!(render(&ws, obj), "{ x: 1, y: 2, }");

    let empty = ws.add_block(BlockKind::ObjectLiteral);
    assert_eq!(render(&ws, empty), "{}");
}

#[test]
fn equal_rank_operands_are_not_parenthesized() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let two = number(&mut ws, "2");
    let three = number(&mut ws, "3");
    let sum = binary(&mut ws, BlockKind::AnyConcat, one, two);
    let diff = binary(&mut ws, BlockKind::MathSubtract, sum, three);

    assert_eq!(render(&ws, diff), "1 + 2 - 3");
}

#[test]
fn looser_operands_are_parenthesized() {
    let mut ws = Workspace::new();
    let one = number(&mut ws, "1");
    let two = number(&mut ws, "2");
    let three = number(&mut ws, "3");
    let sum = binary(&mut ws, BlockKind::AnyConcat, one, two);
    let product = binary(&mut ws, BlockKind::MathMultiply, sum, three);

    let a = var(&mut ws, "a");
    let b = var(&mut ws, "b");
    let c = var(&mut ws, "c");
    let or = binary(&mut ws, BlockKind::LogicOr, a, b);
    let and = binary(&mut ws, BlockKind::LogicAnd, or, c);

    assert_eq!(render(&ws, product), "(1 + 2) * 3");
    assert_eq!(render(&ws, and), "(a || b) && c");
}

#[test]
fn logic_not_wraps_its_operand_once() {
    let mut ws = Workspace::new();
    let a = var(&mut ws, "a");
    let b = var(&mut ws, "b");
    let and = binary(&mut ws, BlockKind::LogicAnd, a, b);
    let not = ws.add_block(BlockKind::LogicNot);
    ws.connect_input(not, "BOOL", and);

    assert_eq!(render(&ws, not), "!(a && b)");
}

#[test]
fn if_body_is_indented_and_terminated() {
    let mut ws = Workspace::new();
    let x = var(&mut ws, "x");
    let one = number(&mut ws, "1");
    let cond = binary(&mut ws, BlockKind::ComparisonGt, x, one);
    let ret_value = var(&mut ws, "x");
    let ret = ws.add_block(BlockKind::ReturnStatement);
    ws.connect_input(ret, "VALUE", ret_value);
    let branch = ws.add_top_block(BlockKind::IfStatement, 0.0, 0.0);
    ws.connect_input(branch, "CONDITION", cond);
    ws.connect_input(branch, "DO", ret);

    assert_eq!(generate(&ws), "if x > 1 {\n  res x;\n}\n");
}

#[test]
fn statement_chains_render_in_order() {
    let mut ws = Workspace::new();
    let first = ws.add_top_block(BlockKind::VariableDeclaration, 0.0, 0.0);
    ws.set_field(first, "VAR_NAME", "a");
    let one = number(&mut ws, "1");
    ws.connect_input(first, "VALUE", one);
    let second = ws.add_block(BlockKind::ReturnStatement);
    let a = var(&mut ws, "a");
    ws.connect_input(second, "VALUE", a);
    ws.connect_next(first, second);

    assert_eq!(generate(&ws), "vl a = 1;\nres a;\n");
}

#[test]
fn naked_top_level_expressions_are_terminated() {
    let mut ws = Workspace::new();
    let callee = string(&mut ws, "init");
    let call = ws.add_top_block(BlockKind::FunctionCall, 0.0, 50.0);
    ws.connect_input(call, "FUNCTION_NAME", callee);
    let decl = ws.add_top_block(BlockKind::VariableDeclaration, 0.0, 0.0);
    ws.set_field(decl, "VAR_NAME", "ready");
    let t = ws.add_block(BlockKind::BooleanLiteral);
    ws.set_field(t, "BOOL", "true");
    ws.connect_input(decl, "VALUE", t);

    let code = generate(&ws);
    assert_eq!(code, "vl ready = true;\n\ninit();");
    let generator = HexputGenerator::new();
    assert_eq!(generator.finish(&code), code);
}

#[test]
fn empty_workspace_generates_nothing() {
    assert_eq!(generate(&Workspace::new()), "");
}

#[test]
fn cyclic_chains_are_reported() {
    let mut ws = Workspace::new();
    let a = ws.add_top_block(BlockKind::ReturnStatement, 0.0, 0.0);
    let b = ws.add_block(BlockKind::ReturnStatement);
    ws.connect_next(a, b);
    ws.connect_next(b, a);

    let err = HexputGenerator::new().workspace_to_code(&ws).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GenerateError>(),
        Some(GenerateError::Cycle { .. })
    ));
}

#[test]
fn statement_in_value_socket_is_rejected() {
    let mut ws = Workspace::new();
    let inner = ws.add_block(BlockKind::ReturnStatement);
    let decl = ws.add_top_block(BlockKind::VariableDeclaration, 0.0, 0.0);
    ws.connect_input(decl, "VALUE", inner);

    let err = HexputGenerator::new().workspace_to_code(&ws).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GenerateError>(),
        Some(GenerateError::ExpectedValue { .. })
    ));
}

#[test]
fn custom_literals_need_a_routine() {
    let mut ws = Workspace::new();
    let pi = ws.add_block(BlockKind::Custom("pi".to_string()));
    let decl = ws.add_top_block(BlockKind::VariableDeclaration, 0.0, 0.0);
    ws.set_field(decl, "VAR_NAME", "p");
    ws.connect_input(decl, "VALUE", pi);

    let err = HexputGenerator::new().workspace_to_code(&ws).unwrap_err();
    assert_eq!(
        err.downcast_ref::<GenerateError>(),
        Some(&GenerateError::UnknownCustomType("pi".to_string()))
    );

    let mut generator = HexputGenerator::new();
    generator.register_custom_literal("pi", "3.14159").unwrap();
    assert_eq!(generator.workspace_to_code(&ws).unwrap(), "vl p = 3.14159;\n");
}

#[test]
fn loop_iterable_binds_at_member_order() {
    let mut ws = Workspace::new();
    let a = var(&mut ws, "a");
    let b = var(&mut ws, "b");
    let sum = binary(&mut ws, BlockKind::AnyConcat, a, b);
    let over_sum = ws.add_block(BlockKind::LoopStatement);
    ws.set_field(over_sum, "ITER_VAR", "x");
    ws.connect_input(over_sum, "ITERABLE", sum);

    let user = var(&mut ws, "user");
    let items = ws.add_block(BlockKind::ObjectPropertyAccess);
    ws.connect_input(items, "OBJECT", user);
    ws.set_field(items, "PROPERTY", "items");
    let over_member = ws.add_block(BlockKind::LoopStatement);
    ws.set_field(over_member, "ITER_VAR", "item");
    ws.connect_input(over_member, "ITERABLE", items);

    assert_eq!(render(&ws, over_sum), "loop x in (a + b) {\n}\n");
    assert_eq!(render(&ws, over_member), "loop item in user.items {\n}\n");
}

#[test]
fn callee_is_wrapped_at_atomic_order_before_unwrapping() {
    let mut ws = Workspace::new();
    let a = var(&mut ws, "a");
    let b = var(&mut ws, "b");
    let left = binary(&mut ws, BlockKind::ComparisonEq, a, b);
    let c = var(&mut ws, "c");
    let d = var(&mut ws, "d");
    let right = binary(&mut ws, BlockKind::ComparisonEq, c, d);
    let sum = binary(&mut ws, BlockKind::AnyConcat, left, right);
    let call = ws.add_block(BlockKind::FunctionCall);
    ws.connect_input(call, "FUNCTION_NAME", sum);

    // Only the outer pair added for the callee is removed.
    assert_eq!(render(&ws, call), "(a == b) + (c == d)()");
}

#[test]
fn string_literals_escape_quotes_and_line_breaks() {
    let mut ws = Workspace::new();
    let text = string(&mut ws, "a\nsaid \"b\"");
    let decl = ws.add_top_block(BlockKind::VariableDeclaration, 0.0, 0.0);
    ws.set_field(decl, "VAR_NAME", "s");
    ws.connect_input(decl, "VALUE", text);

    assert_eq!(generate(&ws), "vl s = \"a\\nsaid \\\"b\\\"\";\n");
}

#[test]
fn long_statement_chains_render_without_recursion() {
    let mut ws = Workspace::new();
    let mut previous = ws.add_top_block(BlockKind::ReturnStatement, 0.0, 0.0);
    for _ in 1..5000 {
        let next = ws.add_block(BlockKind::ReturnStatement);
        ws.connect_next(previous, next);
        previous = next;
    }

    let code = generate(&ws);
    assert_eq!(code.lines().count(), 5000);
    assert!(code.lines().all(|line| line == "res null;"));
}

#[test]
fn cycle_back_into_an_enclosing_chain_is_reported() {
    let mut ws = Workspace::new();
    let branch = ws.add_top_block(BlockKind::IfStatement, 0.0, 0.0);
    let after = ws.add_block(BlockKind::ReturnStatement);
    ws.connect_next(branch, after);
    let inner = ws.add_block(BlockKind::ReturnStatement);
    ws.connect_input(branch, "DO", inner);
    ws.connect_next(inner, branch);

    let err = HexputGenerator::new().workspace_to_code(&ws).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GenerateError>(),
        Some(GenerateError::Cycle { .. })
    ));
}
