use std::sync::Arc;

use alloy_primitives::Bytes;

use crate::{
    sandbox, BlockchainRuntime, ClassLoaderId, CodeTransformer, ContractImage, DappLoader,
    DeployConfig, DeployError, ExternalState, FailureCode, InternedClasses, ObjectGraph,
    SandboxException, TransformedDapp, UnclassifiedFault,
};

/// Leading bytes every contract package accepted by [`ScriptedTransformer`] starts with.
pub const PACKAGE_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Name of the entry constructor a [`ScriptedImage`] must declare to pass verification.
pub const CONSTRUCTOR: &str = "<init>";

/// Builds a contract package accepted by [`ScriptedTransformer`].
pub fn contract_package(body: &[u8]) -> Bytes {
    [PACKAGE_MAGIC.as_slice(), body].concat().into()
}

/// A callback run from inside a scripted image.
pub type ScriptFn = Arc<dyn Fn(&BlockchainRuntime) -> Result<(), DeployError> + Send + Sync>;

/// One step of a scripted static initializer or constructor.
#[derive(Clone, derive_more::Debug)]
pub enum Op {
    /// Bills computation through the sandbox instrumentation.
    Charge(u64),
    /// Creates objects, consuming object identities.
    Allocate(u32),
    /// Prints through the runtime.
    Println(String),
    /// Nests this many method invocations, then returns from all of them.
    Recurse(u32),
    /// Raises a recognized sandbox exception.
    Throw(SandboxException),
    /// Raises an unclassified fault.
    Fault(String),
    /// Panics.
    Panic(String),
    /// Runs arbitrary code, e.g. a nested deployment.
    Run(#[debug(ignore)] ScriptFn),
}

impl Op {
    /// Wraps `f` in an [`Op::Run`].
    pub fn run(
        f: impl Fn(&BlockchainRuntime) -> Result<(), DeployError> + Send + Sync + 'static,
    ) -> Self {
        Self::Run(Arc::new(f))
    }
}

/// A [`ContractImage`] whose static initializer and constructor are lists of [`Op`]s.
#[derive(Debug, Clone)]
pub struct ScriptedImage {
    entry_points: Vec<String>,
    classes: Vec<String>,
    clinit: Vec<Op>,
    constructor: Vec<Op>,
    graph_size: usize,
    class_loader: ClassLoaderId,
    preserve_debuggability: bool,
}

impl Default for ScriptedImage {
    fn default() -> Self {
        Self {
            entry_points: vec![CONSTRUCTOR.to_string()],
            classes: vec!["Main".to_string()],
            clinit: Vec::new(),
            constructor: Vec::new(),
            graph_size: 16,
            class_loader: ClassLoaderId::default(),
            preserve_debuggability: false,
        }
    }
}

impl ScriptedImage {
    /// Replaces the declared entry points.
    pub fn with_entry_points<S: Into<String>>(
        mut self,
        entry_points: impl IntoIterator<Item = S>,
    ) -> Self {
        self.entry_points = entry_points.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the loaded classes.
    pub fn with_classes<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the static initializer.
    pub fn with_clinit(mut self, ops: impl IntoIterator<Item = Op>) -> Self {
        self.clinit = ops.into_iter().collect();
        self
    }

    /// Sets the constructor.
    pub fn with_constructor(mut self, ops: impl IntoIterator<Item = Op>) -> Self {
        self.constructor = ops.into_iter().collect();
        self
    }

    /// Sets the size of the serialized object graph.
    pub fn with_graph_size(mut self, graph_size: usize) -> Self {
        self.graph_size = graph_size;
        self
    }

    /// Whether the loader was asked to keep debug metadata.
    pub const fn preserve_debuggability(&self) -> bool {
        self.preserve_debuggability
    }

    fn run(ops: &[Op], runtime: &BlockchainRuntime) -> Result<(), DeployError> {
        for op in ops {
            match op {
                Op::Charge(cost) => sandbox::charge_energy(*cost)?,
                Op::Allocate(count) => {
                    for _ in 0..*count {
                        sandbox::next_hash_code()?;
                    }
                }
                Op::Println(line) => {
                    runtime.println(line);
                }
                Op::Recurse(depth) => {
                    for _ in 0..*depth {
                        sandbox::enter_method()?;
                    }
                    for _ in 0..*depth {
                        sandbox::exit_method()?;
                    }
                }
                Op::Throw(exception) => return Err(exception.clone().into()),
                Op::Fault(message) => return Err(UnclassifiedFault::other(message.clone()).into()),
                Op::Panic(message) => panic!("{message}"),
                Op::Run(f) => f(runtime)?,
            }
        }
        Ok(())
    }
}

impl ContractImage for ScriptedImage {
    fn verify_methods(&self) -> Result<(), DeployError> {
        if self.entry_points.iter().any(|entry| entry == CONSTRUCTOR) {
            Ok(())
        } else {
            Err(SandboxException::Validation {
                code: FailureCode::MethodNotFound,
                message: format!("missing entry point {CONSTRUCTOR}"),
            }
            .into())
        }
    }

    fn class_loader(&self) -> ClassLoaderId {
        self.class_loader
    }

    fn interned_classes(&self) -> InternedClasses {
        self.classes.iter().map(String::as_str).collect()
    }

    fn initialize_classes(&mut self, runtime: &BlockchainRuntime) -> Result<(), DeployError> {
        Self::run(&self.clinit, runtime)
    }

    fn construct(
        &mut self,
        runtime: &BlockchainRuntime,
        _params: &Bytes,
    ) -> Result<(), DeployError> {
        Self::run(&self.constructor, runtime)
    }

    fn save_entire_graph(
        &mut self,
        next_hash_code: u32,
        _max_size: usize,
    ) -> Result<ObjectGraph, DeployError> {
        let mut bytes = vec![0u8; self.graph_size];
        let tag = next_hash_code.to_be_bytes();
        let len = tag.len().min(bytes.len());
        bytes[..len].copy_from_slice(&tag[..len]);
        Ok(ObjectGraph::new(next_hash_code, bytes))
    }
}

/// A [`CodeTransformer`] that accepts any package starting with [`PACKAGE_MAGIC`] and yields a
/// copy of its prototype image.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransformer {
    prototype: ScriptedImage,
}

impl ScriptedTransformer {
    /// Creates a transformer producing `prototype`.
    pub const fn new(prototype: ScriptedImage) -> Self {
        Self { prototype }
    }
}

impl CodeTransformer for ScriptedTransformer {
    type Module = ScriptedImage;

    fn transform<S: ExternalState>(
        &self,
        state: &S,
        _config: &DeployConfig,
    ) -> Result<TransformedDapp<Self::Module>, DeployError> {
        let code = state.code().ok_or(SandboxException::Transformation {
            code: FailureCode::ContractNotFound,
            message: "no contract package".to_string(),
        })?;
        if !code.starts_with(&PACKAGE_MAGIC) {
            return Err(SandboxException::Transformation {
                code: FailureCode::IllegalFormat,
                message: "not a contract package".to_string(),
            }
            .into());
        }
        let apis = self.prototype.entry_points.join(",").into_bytes().into();
        let transformed = [b"sandboxed:".as_slice(), &code[PACKAGE_MAGIC.len()..]].concat();
        Ok(TransformedDapp { module: self.prototype.clone(), apis, code: transformed.into() })
    }
}

/// A [`DappLoader`] for [`ScriptedImage`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedLoader {
    class_loader: ClassLoaderId,
}

impl ScriptedLoader {
    /// Creates a loader tagging every image with `class_loader`.
    pub const fn new(class_loader: ClassLoaderId) -> Self {
        Self { class_loader }
    }
}

impl DappLoader for ScriptedLoader {
    type Module = ScriptedImage;
    type Image = ScriptedImage;

    fn load(
        &self,
        mut module: Self::Module,
        _apis: &Bytes,
        preserve_debuggability: bool,
    ) -> Result<Self::Image, DeployError> {
        module.class_loader = self.class_loader;
        module.preserve_debuggability = preserve_debuggability;
        Ok(module)
    }
}
