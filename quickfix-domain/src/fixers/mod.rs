use crate::classify::{Params, Shape};
use crate::error::FixFailure;
use quickfix_types::{Ast, NodeId};

mod blank_import;
mod define_to_assign;
mod discard_binding;

pub use blank_import::BlankImportFixer;
pub use define_to_assign::DefineToAssignFixer;
pub use discard_binding::{DiscardBindingFixer, discard_stmt};

/// A structural edit for one diagnostic shape.
///
/// `chain` runs from the file root to the innermost node at the diagnostic
/// position. Appliers search it innermost first.
pub trait Fixer {
    fn shape(&self) -> Shape;

    fn apply(&self, ast: &mut Ast, chain: &[NodeId], params: &Params) -> Result<(), FixFailure>;
}

pub fn builtin_fixers() -> Vec<Box<dyn Fixer>> {
    vec![
        Box::new(DiscardBindingFixer),
        Box::new(BlankImportFixer),
        Box::new(DefineToAssignFixer),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_one_fixer_per_shape() {
        let fixers = builtin_fixers();
        for shape in Shape::ALL {
            assert_eq!(
                fixers.iter().filter(|f| f.shape() == shape).count(),
                1,
                "{shape}"
            );
        }
    }
}
