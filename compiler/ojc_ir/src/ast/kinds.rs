//! Node kinds.

use smallvec::SmallVec;

use super::NodeId;

/// Which dispatch table a method belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectorType {
    /// `+` methods, called on the class object.
    Class,
    /// `-` methods, called on instances.
    Instance,
}

impl SelectorType {
    /// The sigil used in source and in `@FUNCTION` names.
    pub const fn sigil(self) -> char {
        match self {
            SelectorType::Class => '+',
            SelectorType::Instance => '-',
        }
    }
}

/// A literal value. Null and boolean spellings are already normalized.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    /// Numeric literal, kept as written.
    Number(String),
    /// Decoded string contents.
    String(String),
}

impl Literal {
    /// Render the literal as script source.
    pub fn to_source(&self) -> String {
        match self {
            Literal::Null => "null".to_string(),
            Literal::Bool(true) => "true".to_string(),
            Literal::Bool(false) => "false".to_string(),
            Literal::Number(raw) => raw.clone(),
            Literal::String(value) => quote(value),
        }
    }
}

/// Double-quote a string, escaping what a script string literal requires.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Arguments carried by one message selector piece.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectorArgs {
    None,
    Single(NodeId),
    /// Comma-separated trailing arguments, packed into an array at the call.
    Variadic(Vec<NodeId>),
}

/// One `@property` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyAttribute {
    ReadOnly,
    ReadWrite,
    Copy,
    Strong,
    Weak,
    Atomic,
    NonAtomic,
    Getter(String),
    Setter(String),
}

/// `@synthesize property = ivar` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesizePair {
    pub property: String,
    pub ivar: Option<String>,
}

/// Shared shape of function declarations and expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub id: Option<NodeId>,
    pub params: Vec<NodeId>,
    /// Return type annotation.
    pub annotation: Option<NodeId>,
    pub body: NodeId,
}

/// Method header shared by definitions and protocol declarations.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSignature {
    pub selector_type: SelectorType,
    pub selector_name: String,
    /// `TypeAnnotation` for the return type, absent means `id`.
    pub return_type: Option<NodeId>,
    /// `MethodSelector` pieces in source order.
    pub selectors: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Program {
        body: Vec<NodeId>,
    },

    // Statements
    EmptyStatement,
    DebuggerStatement,
    ExpressionStatement {
        expression: NodeId,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    VariableDeclaration {
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        init: Option<NodeId>,
    },
    FunctionDeclaration(Function),
    ReturnStatement {
        argument: Option<NodeId>,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForInStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },

    // Expressions
    Identifier {
        name: String,
        annotation: Option<NodeId>,
    },
    Literal(Literal),
    ThisExpression,
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    Property {
        key: NodeId,
        value: NodeId,
        computed: bool,
    },
    FunctionExpression(Function),
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    AssignmentExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    BinaryExpression {
        operator: String,
        left: NodeId,
        right: NodeId,
    },
    UnaryExpression {
        operator: String,
        argument: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    SequenceExpression {
        expressions: Vec<NodeId>,
    },

    // Class forms
    ClassImplementation {
        id: NodeId,
        superclass: Option<NodeId>,
        /// Set for `@implementation Foo (Category)`.
        category: Option<String>,
        ivar_block: Option<NodeId>,
        /// `ClassBody` holding everything up to `@end`.
        body: NodeId,
    },
    ClassBody {
        body: Vec<NodeId>,
    },
    IvarBlock {
        declarations: Vec<NodeId>,
    },
    IvarDeclaration {
        type_name: String,
        names: Vec<NodeId>,
    },
    MethodDefinition {
        signature: MethodSignature,
        body: NodeId,
    },
    MethodSelector {
        name: String,
        variable: Option<NodeId>,
        param_type: Option<NodeId>,
    },
    MethodDeclaration {
        signature: MethodSignature,
        optional: bool,
    },
    ProtocolDefinition {
        id: NodeId,
        body: Vec<NodeId>,
    },
    PropertyDirective {
        attributes: Vec<PropertyAttribute>,
        type_name: String,
        id: NodeId,
    },
    SynthesizeDirective {
        pairs: Vec<SynthesizePair>,
    },
    DynamicDirective {
        names: Vec<String>,
    },

    // Message forms
    MessageExpression {
        receiver: NodeId,
        selector_name: String,
        selectors: Vec<NodeId>,
    },
    MessageSelector {
        name: String,
        arguments: SelectorArgs,
    },
    SelectorDirective {
        name: String,
    },

    // Other extensions
    ClassDirective {
        names: Vec<String>,
    },
    SqueezeDirective {
        names: Vec<String>,
    },
    TypedefDeclaration {
        from: String,
        to: String,
    },
    EnumDeclaration {
        id: Option<NodeId>,
        unsigned: bool,
        /// `VariableDeclarator` members.
        declarations: Vec<NodeId>,
    },
    ConstDeclaration {
        declarations: Vec<NodeId>,
    },
    GlobalDeclaration {
        declaration: Option<NodeId>,
        declarators: Vec<NodeId>,
    },
    EachStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    CastExpression {
        type_name: String,
        argument: NodeId,
    },
    AnyExpression {
        argument: NodeId,
    },
    TypeAnnotation {
        value: String,
    },
    PredefinedMacro {
        name: String,
    },
}

impl NodeKind {
    /// Child nodes in source order.
    pub fn children(&self) -> SmallVec<[NodeId; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::EmptyStatement
            | NodeKind::DebuggerStatement
            | NodeKind::Literal(_)
            | NodeKind::ThisExpression
            | NodeKind::SynthesizeDirective { .. }
            | NodeKind::DynamicDirective { .. }
            | NodeKind::SelectorDirective { .. }
            | NodeKind::ClassDirective { .. }
            | NodeKind::SqueezeDirective { .. }
            | NodeKind::TypedefDeclaration { .. }
            | NodeKind::TypeAnnotation { .. }
            | NodeKind::PredefinedMacro { .. } => {}

            NodeKind::Program { body }
            | NodeKind::BlockStatement { body }
            | NodeKind::ClassBody { body }
            | NodeKind::VariableDeclaration { declarations: body }
            | NodeKind::ObjectExpression { properties: body }
            | NodeKind::SequenceExpression { expressions: body }
            | NodeKind::IvarBlock { declarations: body }
            | NodeKind::ConstDeclaration { declarations: body }
            | NodeKind::IvarDeclaration { names: body, .. } => out.extend(body.iter().copied()),

            NodeKind::ExpressionStatement { expression } => out.push(*expression),
            NodeKind::VariableDeclarator { id, init } => {
                out.push(*id);
                out.extend(*init);
            }
            NodeKind::FunctionDeclaration(function) | NodeKind::FunctionExpression(function) => {
                out.extend(function.id);
                out.extend(function.params.iter().copied());
                out.extend(function.annotation);
                out.push(function.body);
            }
            NodeKind::ReturnStatement { argument } => out.extend(*argument),
            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.extend(*alternate);
            }
            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                out.extend(*init);
                out.extend(*test);
                out.extend(*update);
                out.push(*body);
            }
            NodeKind::ForInStatement { left, right, body }
            | NodeKind::EachStatement { left, right, body } => {
                out.push(*left);
                out.push(*right);
                out.push(*body);
            }
            NodeKind::WhileStatement { test, body } => {
                out.push(*test);
                out.push(*body);
            }
            NodeKind::Identifier { annotation, .. } => out.extend(*annotation),
            NodeKind::ArrayExpression { elements } => out.extend(elements.iter().flatten().copied()),
            NodeKind::Property { key, value, .. } => {
                out.push(*key);
                out.push(*value);
            }
            NodeKind::MemberExpression {
                object, property, ..
            } => {
                out.push(*object);
                out.push(*property);
            }
            NodeKind::CallExpression { callee, arguments }
            | NodeKind::NewExpression { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments.iter().copied());
            }
            NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::BinaryExpression { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::UnaryExpression { argument, .. }
            | NodeKind::CastExpression { argument, .. }
            | NodeKind::AnyExpression { argument } => out.push(*argument),
            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            NodeKind::ClassImplementation {
                id,
                superclass,
                ivar_block,
                body,
                ..
            } => {
                out.push(*id);
                out.extend(*superclass);
                out.extend(*ivar_block);
                out.push(*body);
            }
            NodeKind::MethodDefinition { signature, body } => {
                out.extend(signature.return_type);
                out.extend(signature.selectors.iter().copied());
                out.push(*body);
            }
            NodeKind::MethodDeclaration { signature, .. } => {
                out.extend(signature.return_type);
                out.extend(signature.selectors.iter().copied());
            }
            NodeKind::MethodSelector {
                variable,
                param_type,
                ..
            } => {
                out.extend(*param_type);
                out.extend(*variable);
            }
            NodeKind::ProtocolDefinition { id, body } => {
                out.push(*id);
                out.extend(body.iter().copied());
            }
            NodeKind::PropertyDirective { id, .. } => out.push(*id),
            NodeKind::MessageExpression {
                receiver,
                selectors,
                ..
            } => {
                out.push(*receiver);
                out.extend(selectors.iter().copied());
            }
            NodeKind::MessageSelector { arguments, .. } => match arguments {
                SelectorArgs::None => {}
                SelectorArgs::Single(argument) => out.push(*argument),
                SelectorArgs::Variadic(arguments) => out.extend(arguments.iter().copied()),
            },
            NodeKind::EnumDeclaration {
                id, declarations, ..
            } => {
                out.extend(*id);
                out.extend(declarations.iter().copied());
            }
            NodeKind::GlobalDeclaration {
                declaration,
                declarators,
            } => {
                out.extend(*declaration);
                out.extend(declarators.iter().copied());
            }
        }
        out
    }

    /// Short name for logging and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::FunctionDeclaration(_) => "FunctionDeclaration",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal(_) => "Literal",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::FunctionExpression(_) => "FunctionExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::SequenceExpression { .. } => "SequenceExpression",
            NodeKind::ClassImplementation { .. } => "ClassImplementation",
            NodeKind::ClassBody { .. } => "ClassBody",
            NodeKind::IvarBlock { .. } => "IvarBlock",
            NodeKind::IvarDeclaration { .. } => "IvarDeclaration",
            NodeKind::MethodDefinition { .. } => "MethodDefinition",
            NodeKind::MethodSelector { .. } => "MethodSelector",
            NodeKind::MethodDeclaration { .. } => "MethodDeclaration",
            NodeKind::ProtocolDefinition { .. } => "ProtocolDefinition",
            NodeKind::PropertyDirective { .. } => "PropertyDirective",
            NodeKind::SynthesizeDirective { .. } => "SynthesizeDirective",
            NodeKind::DynamicDirective { .. } => "DynamicDirective",
            NodeKind::MessageExpression { .. } => "MessageExpression",
            NodeKind::MessageSelector { .. } => "MessageSelector",
            NodeKind::SelectorDirective { .. } => "SelectorDirective",
            NodeKind::ClassDirective { .. } => "ClassDirective",
            NodeKind::SqueezeDirective { .. } => "SqueezeDirective",
            NodeKind::TypedefDeclaration { .. } => "TypedefDeclaration",
            NodeKind::EnumDeclaration { .. } => "EnumDeclaration",
            NodeKind::ConstDeclaration { .. } => "ConstDeclaration",
            NodeKind::GlobalDeclaration { .. } => "GlobalDeclaration",
            NodeKind::EachStatement { .. } => "EachStatement",
            NodeKind::CastExpression { .. } => "CastExpression",
            NodeKind::AnyExpression { .. } => "AnyExpression",
            NodeKind::TypeAnnotation { .. } => "TypeAnnotation",
            NodeKind::PredefinedMacro { .. } => "PredefinedMacro",
        }
    }

    /// Function declarations and expressions.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            NodeKind::FunctionDeclaration(function) | NodeKind::FunctionExpression(function) => {
                Some(function)
            }
            _ => None,
        }
    }
}
