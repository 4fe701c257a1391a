//! Linear-sweep analysis of a loaded image.

use std::path::Path;
use std::sync::Arc;

use irre_ir::IlFunction;
use irre_isa::{
    Branch, BranchKind, DecodeError, Decoder, INSTRUCTION_SIZE, Irre, LiftError, Lifter, Token,
};
use irre_rega::{ImageLoader, MemoryImage, RegaImage, RegaLoader};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::options::AnalysisOptions;
use crate::{Error, Result};

/// One disassembled instruction slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub address: u32,
    pub raw: [u8; INSTRUCTION_SIZE],
    pub tokens: Vec<Token>,
    pub branches: Vec<Branch>,
}

/// Result of lifting a whole sweep.
#[derive(Debug, Default)]
pub struct LiftedProgram {
    /// IL for every lifted instruction, in address order.
    pub function: IlFunction,
    /// Number of instruction slots lifted.
    pub instructions: usize,
    pub unknown_opcodes: usize,
    /// Instructions whose lifting failed; each left one unimplemented marker.
    pub failures: Vec<LiftError>,
}

/// A loaded image plus the options to analyze it with.
pub struct Analysis {
    image: RegaImage,
    options: AnalysisOptions,
    arch: Irre,
}

impl Analysis {
    /// Wrap an already loaded image.
    pub fn new(image: RegaImage, options: AnalysisOptions) -> Result<Self> {
        if let Some(start) = options.start {
            if !(image.start()..image.data_end()).contains(&start) {
                return Err(Error::StartOutOfRange(start));
            }
        }
        Ok(Self {
            image,
            options,
            arch: Irre,
        })
    }

    /// Load a REGA file.
    pub fn load(path: &Path, options: AnalysisOptions) -> Result<Self> {
        let image = RegaLoader.load_file(path)?;
        Self::new(image, options)
    }

    /// Load a REGA file and sweep from the named symbol.
    pub fn load_from_symbol(path: &Path, options: AnalysisOptions, name: &str) -> Result<Self> {
        let image = RegaLoader.load_file(path)?;
        let start = image
            .lookup_symbol(name)
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))?;
        let count = options.count;
        Self::new(image, options.with_range(Some(start), count))
    }

    /// Load a headerless program mapped at address 0.
    pub fn load_raw(path: &Path, options: AnalysisOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::new(RegaImage::from_bytecode(data, 0), options)
    }

    #[must_use]
    pub const fn image(&self) -> &RegaImage {
        &self.image
    }

    #[must_use]
    pub const fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Symbol name defined at `address`.
    #[must_use]
    pub fn symbol_at(&self, address: u32) -> Option<&str> {
        if !self.options.symbols {
            return None;
        }
        self.image.symbol_at(address).map(|s| s.name.as_str())
    }

    /// Instruction slot addresses covered by this run.
    #[must_use]
    pub fn slots(&self) -> Vec<u32> {
        let first = self.image.start();
        let start = self.options.start.map_or(first, |start| {
            // align down to the slot grid
            start - (start - first) % 4
        });
        (start..self.image.data_end())
            .step_by(INSTRUCTION_SIZE)
            .take(self.options.count.unwrap_or(usize::MAX))
            .collect()
    }

    fn pool(&self) -> Result<rayon::ThreadPool> {
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.job_count())
            .build()?)
    }

    /// Apply `f` to every slot in parallel, keeping address order.
    ///
    /// Slots that fail to decode (a trailing partial word) are logged and
    /// skipped.
    fn sweep<T, F>(&self, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(u32, &[u8]) -> std::result::Result<T, DecodeError> + Sync,
    {
        let slots = self.slots();
        debug!(
            slots = slots.len(),
            jobs = self.options.job_count(),
            "sweeping image"
        );
        let results: Vec<_> = self.pool()?.install(|| {
            slots
                .par_iter()
                .map(|&address| f(address, self.image.read(address, INSTRUCTION_SIZE)))
                .collect()
        });

        let mut items = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(err) => warn!("{err}"),
            }
        }
        Ok(items)
    }

    /// Disassemble every slot.
    pub fn disassemble(&self) -> Result<Vec<Line>> {
        self.sweep(|address, bytes| {
            let instr = self.arch.decode(bytes, address)?;
            Ok(Line {
                address,
                raw: instr.raw,
                tokens: irre_isa::render(&instr),
                branches: irre_isa::classify(&instr).branches,
            })
        })
    }

    /// Addresses that begin a basic block within the swept range.
    ///
    /// These are the entry point, symbol addresses, direct jump targets, the
    /// fall-through address of each conditional branch and the address after
    /// any instruction that does not fall through.
    pub fn block_starts(&self) -> Result<FxHashSet<u32>> {
        let slots: FxHashSet<u32> = self.slots().into_iter().collect();
        let infos = self.sweep(|address, bytes| {
            let info = self.arch.instruction_info(bytes, address)?;
            Ok((address, info))
        })?;

        let mut starts = FxHashSet::default();
        starts.insert(self.image.entry_point());
        if self.options.symbols {
            starts.extend(self.image.symbols.iter().map(|s| s.address));
        }
        let targets = infos
            .iter()
            .flat_map(|(_, info)| &info.branches)
            .filter(|b| matches!(b.kind, BranchKind::Unconditional | BranchKind::False))
            .filter_map(Branch::address);
        starts.extend(targets);
        let after_exits = infos
            .iter()
            .filter(|(_, info)| !info.falls_through())
            .map(|&(address, _)| address.wrapping_add(4));
        starts.extend(after_exits);
        starts.retain(|addr| slots.contains(addr));
        Ok(starts)
    }

    /// Lift every slot to IL.
    pub fn lift(&self) -> Result<LiftedProgram> {
        let starts = Arc::new(self.block_starts()?);
        let lifted = self.sweep(|address, bytes| {
            let instr = self.arch.decode(bytes, address)?;
            let mut function = IlFunction::with_block_starts(Arc::clone(&starts));
            let outcome = self.arch.lift(&instr, &mut function);
            Ok((function, instr.is_unknown(), outcome))
        })?;

        let mut program = LiftedProgram {
            function: IlFunction::with_block_starts(starts),
            ..LiftedProgram::default()
        };
        for (function, unknown, outcome) in lifted {
            program.function.extend(function);
            program.instructions += 1;
            if unknown {
                program.unknown_opcodes += 1;
            }
            if let Err(err) = outcome {
                program.failures.push(err);
            }
        }
        debug!(
            instructions = program.instructions,
            unknown = program.unknown_opcodes,
            failures = program.failures.len(),
            "lifted image"
        );
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use irre_ir::{Label, Stmt};
    use irre_isa::{BranchTarget, tokens_to_string};

    use super::*;

    fn image(program: &[u8]) -> RegaImage {
        RegaImage::from_bytecode(program.to_vec(), 0)
    }

    fn analysis(program: &[u8]) -> Analysis {
        Analysis::new(image(program), AnalysisOptions::new().with_jobs(2)).unwrap()
    }

    const PROGRAM: [u8; 20] = [
        0x0B, 0x01, 0x10, 0x00, // set r1, 0x10
        0x24, 0x01, 0x02, 0x00, // bve r2, 0x0, reg(r1)
        0x20, 0x10, 0x00, 0x00, // jmi 0x10
        0x22, 0x00, 0x00, 0x00, // db 0x22
        0xFF, 0x00, 0x00, 0x00, // hlt
    ];

    #[test]
    fn test_disassemble_in_order() {
        let lines = analysis(&PROGRAM).disassemble().unwrap();
        let text: Vec<_> = lines.iter().map(|l| tokens_to_string(&l.tokens)).collect();
        assert_eq!(
            text,
            ["set r1, 0x10", "bve r2, 0x0, reg(r1)", "jmi 0x10", "db 0x22", "hlt"]
        );
        assert_eq!(lines[1].address, 4);
        assert_eq!(lines[1].raw, [0x24, 0x01, 0x02, 0x00]);
        assert_eq!(
            lines[1].branches[1],
            Branch::new(BranchKind::False, BranchTarget::Address(8))
        );
    }

    #[test]
    fn test_trailing_partial_word_is_skipped() {
        let mut program = PROGRAM.to_vec();
        program.extend_from_slice(&[0x01, 0x02]);
        let lines = analysis(&program).disassemble().unwrap();
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_range() {
        let options = AnalysisOptions::new().with_range(Some(6), Some(2));
        let analysis = Analysis::new(image(&PROGRAM), options).unwrap();
        assert_eq!(analysis.slots(), [4, 8]);

        let options = AnalysisOptions::new().with_range(Some(0x40), None);
        assert!(matches!(
            Analysis::new(image(&PROGRAM), options),
            Err(Error::StartOutOfRange(0x40))
        ));
    }

    #[test]
    fn test_block_starts() {
        let starts = analysis(&PROGRAM).block_starts().unwrap();
        let mut starts: Vec<_> = starts.into_iter().collect();
        starts.sort_unstable();
        // entry, bve fall-through, after jmi, jmi target
        assert_eq!(starts, [0, 8, 12, 0x10]);
    }

    #[test]
    fn test_block_starts_after_exits() {
        let program = [
            0x21, 0x01, 0x00, 0x00, // jmp r1
            0x2A, 0x02, 0x00, 0x00, // cal r2
            0x2B, 0x00, 0x00, 0x00, // ret
            0xF0, 0x01, 0x00, 0x00, // int 0x1
            0x00, 0x00, 0x00, 0x00, // nop
        ];
        let mut starts: Vec<_> = analysis(&program).block_starts().unwrap().into_iter().collect();
        starts.sort_unstable();
        // cal and int continue, so only jmp and ret open a new block
        assert_eq!(starts, [0, 4, 12]);
    }

    #[test]
    fn test_block_starts_outside_range_are_dropped() {
        let options = AnalysisOptions::new().with_range(None, Some(3));
        let analysis = Analysis::new(image(&PROGRAM), options).unwrap();
        let mut starts: Vec<_> = analysis.block_starts().unwrap().into_iter().collect();
        starts.sort_unstable();
        assert_eq!(starts, [0, 8]);
    }

    #[test]
    fn test_lift_program() {
        let program = analysis(&PROGRAM).lift().unwrap();
        assert_eq!(program.instructions, 5);
        assert_eq!(program.unknown_opcodes, 1);
        assert!(program.failures.is_empty());

        let addresses: Vec<_> = program.function.instructions().map(|(a, _)| a).collect();
        assert_eq!(addresses, [0, 4, 8, 12, 16]);
        // jmi to a block start inside the unit becomes a goto
        assert_eq!(
            program.function.instruction(8),
            Some(&[Stmt::Label(Label::Address(8)), Stmt::Goto(Label::Address(0x10))][..])
        );
        assert_eq!(
            program.function.instruction(12),
            Some(&[Stmt::Label(Label::Address(12)), Stmt::Unimplemented][..])
        );
    }

    #[test]
    fn test_lift_failures_are_counted() {
        // mov UNK_REG_30, r1
        let program = analysis(&[0x0C, 0x30, 0x01, 0x00]).lift().unwrap();
        assert_eq!(
            program.failures,
            [LiftError::InvalidRegister {
                address: 0,
                register: 0x30
            }]
        );
        assert_eq!(program.instructions, 1);
    }

    #[test]
    fn test_symbols_toggle() {
        let mut image = image(&PROGRAM);
        image.symbols.push(irre_rega::Symbol {
            name: "tail".to_string(),
            offset: 12,
            address: 12,
        });
        let with = Analysis::new(image.clone(), AnalysisOptions::new()).unwrap();
        assert_eq!(with.symbol_at(12), Some("tail"));
        assert!(with.block_starts().unwrap().contains(&12));

        let without = Analysis::new(image, AnalysisOptions::new().with_symbols(false)).unwrap();
        assert_eq!(without.symbol_at(12), None);
        assert!(!without.block_starts().unwrap().contains(&12));
    }
}
