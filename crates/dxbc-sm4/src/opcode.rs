//! SM4/SM5 opcode numbering (`D3D10_SB_OPCODE_TYPE` / `D3D11_SB_OPCODE_TYPE`).

/// Opcode token field layout.
pub(crate) const OPCODE_MASK: u32 = 0x7FF;
pub(crate) const CONTROL_SHIFT: u32 = 11;
pub(crate) const CONTROL_MASK: u32 = 0x1FFF;
pub(crate) const LENGTH_SHIFT: u32 = 24;
pub(crate) const LENGTH_MASK: u32 = 0x7F;
pub(crate) const EXTENDED_BIT: u32 = 1 << 31;

/// How the decoder treats an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeClass {
    /// `customdata` blocks: their own length encoding, payload copied verbatim.
    CustomData,
    /// Hull-shader phase markers. `hs_decls` is a declaration; the other three
    /// phase markers also open a phase in the instruction list.
    HullPhase,
    Declaration(DeclarationOpcode),
    Instruction,
}

macro_rules! opcodes {
    ($($name:ident = $value:literal => $mnemonic:literal @$class:ident,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Opcode {
            $($name = $value,)+
        }

        impl Opcode {
            /// Every defined opcode, in numeric order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$name,)+];

            /// Maps an opcode field value; reserved and out-of-range values yield `None`.
            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $($value => Some(Opcode::$name),)+
                    _ => None,
                }
            }

            /// Assembly mnemonic, as printed by the D3D disassembler.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)+
                }
            }

            /// How the decoder routes records starting with this opcode.
            pub const fn class(self) -> OpcodeClass {
                match self {
                    $(Opcode::$name => opcode_class!($class $name),)+
                }
            }
        }
    };
}

macro_rules! opcode_class {
    (custom_data $name:ident) => {
        OpcodeClass::CustomData
    };
    (hull_phase $name:ident) => {
        OpcodeClass::HullPhase
    };
    (declaration $name:ident) => {
        OpcodeClass::Declaration(DeclarationOpcode::$name)
    };
    (instruction $name:ident) => {
        OpcodeClass::Instruction
    };
}

macro_rules! declaration_opcodes {
    ($($name:ident,)+) => {
        /// Opcodes that introduce a declaration record with its own payload layout.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DeclarationOpcode {
            $($name,)+
        }

        impl DeclarationOpcode {
            pub const fn opcode(self) -> Opcode {
                match self {
                    $(DeclarationOpcode::$name => Opcode::$name,)+
                }
            }
        }
    };
}

declaration_opcodes! {
    DclResource,
    DclConstantBuffer,
    DclSampler,
    DclIndexRange,
    DclGsOutputPrimitiveTopology,
    DclGsInputPrimitive,
    DclMaxOutputVertexCount,
    DclInput,
    DclInputSgv,
    DclInputSiv,
    DclInputPs,
    DclInputPsSgv,
    DclInputPsSiv,
    DclOutput,
    DclOutputSgv,
    DclOutputSiv,
    DclTemps,
    DclIndexableTemp,
    DclGlobalFlags,
    DclStream,
    DclFunctionBody,
    DclFunctionTable,
    DclInterface,
    DclInputControlPointCount,
    DclOutputControlPointCount,
    DclTessDomain,
    DclTessPartitioning,
    DclTessOutputPrimitive,
    DclHsMaxTessFactor,
    DclHsForkPhaseInstanceCount,
    DclHsJoinPhaseInstanceCount,
    DclThreadGroup,
    DclUavTyped,
    DclUavRaw,
    DclUavStructured,
    DclTgsmRaw,
    DclTgsmStructured,
    DclResourceRaw,
    DclResourceStructured,
    DclGsInstanceCount,
}

opcodes! {
    Add = 0 => "add" @instruction,
    And = 1 => "and" @instruction,
    Break = 2 => "break" @instruction,
    Breakc = 3 => "breakc" @instruction,
    Call = 4 => "call" @instruction,
    Callc = 5 => "callc" @instruction,
    Case = 6 => "case" @instruction,
    Continue = 7 => "continue" @instruction,
    Continuec = 8 => "continuec" @instruction,
    Cut = 9 => "cut" @instruction,
    Default = 10 => "default" @instruction,
    DerivRtx = 11 => "deriv_rtx" @instruction,
    DerivRty = 12 => "deriv_rty" @instruction,
    Discard = 13 => "discard" @instruction,
    Div = 14 => "div" @instruction,
    Dp2 = 15 => "dp2" @instruction,
    Dp3 = 16 => "dp3" @instruction,
    Dp4 = 17 => "dp4" @instruction,
    Else = 18 => "else" @instruction,
    Emit = 19 => "emit" @instruction,
    EmitThenCut = 20 => "emit_then_cut" @instruction,
    EndIf = 21 => "endif" @instruction,
    EndLoop = 22 => "endloop" @instruction,
    EndSwitch = 23 => "endswitch" @instruction,
    Eq = 24 => "eq" @instruction,
    Exp = 25 => "exp" @instruction,
    Frc = 26 => "frc" @instruction,
    FtoI = 27 => "ftoi" @instruction,
    FtoU = 28 => "ftou" @instruction,
    Ge = 29 => "ge" @instruction,
    IAdd = 30 => "iadd" @instruction,
    If = 31 => "if" @instruction,
    IEq = 32 => "ieq" @instruction,
    IGe = 33 => "ige" @instruction,
    ILt = 34 => "ilt" @instruction,
    IMad = 35 => "imad" @instruction,
    IMax = 36 => "imax" @instruction,
    IMin = 37 => "imin" @instruction,
    IMul = 38 => "imul" @instruction,
    INe = 39 => "ine" @instruction,
    INeg = 40 => "ineg" @instruction,
    IShl = 41 => "ishl" @instruction,
    IShr = 42 => "ishr" @instruction,
    ItoF = 43 => "itof" @instruction,
    Label = 44 => "label" @instruction,
    Ld = 45 => "ld" @instruction,
    LdMs = 46 => "ld_ms" @instruction,
    Log = 47 => "log" @instruction,
    Loop = 48 => "loop" @instruction,
    Lt = 49 => "lt" @instruction,
    Mad = 50 => "mad" @instruction,
    Min = 51 => "min" @instruction,
    Max = 52 => "max" @instruction,
    CustomData = 53 => "customdata" @custom_data,
    Mov = 54 => "mov" @instruction,
    Movc = 55 => "movc" @instruction,
    Mul = 56 => "mul" @instruction,
    Ne = 57 => "ne" @instruction,
    Nop = 58 => "nop" @instruction,
    Not = 59 => "not" @instruction,
    Or = 60 => "or" @instruction,
    ResInfo = 61 => "resinfo" @instruction,
    Ret = 62 => "ret" @instruction,
    Retc = 63 => "retc" @instruction,
    RoundNe = 64 => "round_ne" @instruction,
    RoundNi = 65 => "round_ni" @instruction,
    RoundPi = 66 => "round_pi" @instruction,
    RoundZ = 67 => "round_z" @instruction,
    Rsq = 68 => "rsq" @instruction,
    Sample = 69 => "sample" @instruction,
    SampleC = 70 => "sample_c" @instruction,
    SampleCLz = 71 => "sample_c_lz" @instruction,
    SampleL = 72 => "sample_l" @instruction,
    SampleD = 73 => "sample_d" @instruction,
    SampleB = 74 => "sample_b" @instruction,
    Sqrt = 75 => "sqrt" @instruction,
    Switch = 76 => "switch" @instruction,
    SinCos = 77 => "sincos" @instruction,
    UDiv = 78 => "udiv" @instruction,
    ULt = 79 => "ult" @instruction,
    UGe = 80 => "uge" @instruction,
    UMul = 81 => "umul" @instruction,
    UMad = 82 => "umad" @instruction,
    UMax = 83 => "umax" @instruction,
    UMin = 84 => "umin" @instruction,
    UShr = 85 => "ushr" @instruction,
    UtoF = 86 => "utof" @instruction,
    Xor = 87 => "xor" @instruction,
    DclResource = 88 => "dcl_resource" @declaration,
    DclConstantBuffer = 89 => "dcl_constantbuffer" @declaration,
    DclSampler = 90 => "dcl_sampler" @declaration,
    DclIndexRange = 91 => "dcl_indexrange" @declaration,
    DclGsOutputPrimitiveTopology = 92 => "dcl_outputtopology" @declaration,
    DclGsInputPrimitive = 93 => "dcl_inputprimitive" @declaration,
    DclMaxOutputVertexCount = 94 => "dcl_maxout" @declaration,
    DclInput = 95 => "dcl_input" @declaration,
    DclInputSgv = 96 => "dcl_input_sgv" @declaration,
    DclInputSiv = 97 => "dcl_input_siv" @declaration,
    DclInputPs = 98 => "dcl_input_ps" @declaration,
    DclInputPsSgv = 99 => "dcl_input_ps_sgv" @declaration,
    DclInputPsSiv = 100 => "dcl_input_ps_siv" @declaration,
    DclOutput = 101 => "dcl_output" @declaration,
    DclOutputSgv = 102 => "dcl_output_sgv" @declaration,
    DclOutputSiv = 103 => "dcl_output_siv" @declaration,
    DclTemps = 104 => "dcl_temps" @declaration,
    DclIndexableTemp = 105 => "dcl_indexableTemp" @declaration,
    DclGlobalFlags = 106 => "dcl_globalFlags" @declaration,
    Lod = 108 => "lod" @instruction,
    Gather4 = 109 => "gather4" @instruction,
    SamplePos = 110 => "samplepos" @instruction,
    SampleInfo = 111 => "sampleinfo" @instruction,
    HsDecls = 113 => "hs_decls" @hull_phase,
    HsControlPointPhase = 114 => "hs_control_point_phase" @hull_phase,
    HsForkPhase = 115 => "hs_fork_phase" @hull_phase,
    HsJoinPhase = 116 => "hs_join_phase" @hull_phase,
    EmitStream = 117 => "emit_stream" @instruction,
    CutStream = 118 => "cut_stream" @instruction,
    EmitThenCutStream = 119 => "emit_then_cut_stream" @instruction,
    InterfaceCall = 120 => "fcall" @instruction,
    BufInfo = 121 => "bufinfo" @instruction,
    DerivRtxCoarse = 122 => "deriv_rtx_coarse" @instruction,
    DerivRtxFine = 123 => "deriv_rtx_fine" @instruction,
    DerivRtyCoarse = 124 => "deriv_rty_coarse" @instruction,
    DerivRtyFine = 125 => "deriv_rty_fine" @instruction,
    Gather4C = 126 => "gather4_c" @instruction,
    Gather4Po = 127 => "gather4_po" @instruction,
    Gather4PoC = 128 => "gather4_po_c" @instruction,
    Rcp = 129 => "rcp" @instruction,
    F32toF16 = 130 => "f32tof16" @instruction,
    F16toF32 = 131 => "f16tof32" @instruction,
    UAddc = 132 => "uaddc" @instruction,
    USubb = 133 => "usubb" @instruction,
    CountBits = 134 => "countbits" @instruction,
    FirstBitHi = 135 => "firstbit_hi" @instruction,
    FirstBitLo = 136 => "firstbit_lo" @instruction,
    FirstBitShi = 137 => "firstbit_shi" @instruction,
    UBfe = 138 => "ubfe" @instruction,
    IBfe = 139 => "ibfe" @instruction,
    Bfi = 140 => "bfi" @instruction,
    BfRev = 141 => "bfrev" @instruction,
    Swapc = 142 => "swapc" @instruction,
    DclStream = 143 => "dcl_stream" @declaration,
    DclFunctionBody = 144 => "dcl_function_body" @declaration,
    DclFunctionTable = 145 => "dcl_function_table" @declaration,
    DclInterface = 146 => "dcl_interface" @declaration,
    DclInputControlPointCount = 147 => "dcl_input_control_point_count" @declaration,
    DclOutputControlPointCount = 148 => "dcl_output_control_point_count" @declaration,
    DclTessDomain = 149 => "dcl_tessellator_domain" @declaration,
    DclTessPartitioning = 150 => "dcl_tessellator_partitioning" @declaration,
    DclTessOutputPrimitive = 151 => "dcl_tessellator_output_primitive" @declaration,
    DclHsMaxTessFactor = 152 => "dcl_hs_max_tessfactor" @declaration,
    DclHsForkPhaseInstanceCount = 153 => "dcl_hs_fork_phase_instance_count" @declaration,
    DclHsJoinPhaseInstanceCount = 154 => "dcl_hs_join_phase_instance_count" @declaration,
    DclThreadGroup = 155 => "dcl_thread_group" @declaration,
    DclUavTyped = 156 => "dcl_uav_typed" @declaration,
    DclUavRaw = 157 => "dcl_uav_raw" @declaration,
    DclUavStructured = 158 => "dcl_uav_structured" @declaration,
    DclTgsmRaw = 159 => "dcl_tgsm_raw" @declaration,
    DclTgsmStructured = 160 => "dcl_tgsm_structured" @declaration,
    DclResourceRaw = 161 => "dcl_resource_raw" @declaration,
    DclResourceStructured = 162 => "dcl_resource_structured" @declaration,
    LdUavTyped = 163 => "ld_uav_typed" @instruction,
    StoreUavTyped = 164 => "store_uav_typed" @instruction,
    LdRaw = 165 => "ld_raw" @instruction,
    StoreRaw = 166 => "store_raw" @instruction,
    LdStructured = 167 => "ld_structured" @instruction,
    StoreStructured = 168 => "store_structured" @instruction,
    AtomicAnd = 169 => "atomic_and" @instruction,
    AtomicOr = 170 => "atomic_or" @instruction,
    AtomicXor = 171 => "atomic_xor" @instruction,
    AtomicCmpStore = 172 => "atomic_cmp_store" @instruction,
    AtomicIAdd = 173 => "atomic_iadd" @instruction,
    AtomicIMax = 174 => "atomic_imax" @instruction,
    AtomicIMin = 175 => "atomic_imin" @instruction,
    AtomicUMax = 176 => "atomic_umax" @instruction,
    AtomicUMin = 177 => "atomic_umin" @instruction,
    ImmAtomicAlloc = 178 => "imm_atomic_alloc" @instruction,
    ImmAtomicConsume = 179 => "imm_atomic_consume" @instruction,
    ImmAtomicIAdd = 180 => "imm_atomic_iadd" @instruction,
    ImmAtomicAnd = 181 => "imm_atomic_and" @instruction,
    ImmAtomicOr = 182 => "imm_atomic_or" @instruction,
    ImmAtomicXor = 183 => "imm_atomic_xor" @instruction,
    ImmAtomicExch = 184 => "imm_atomic_exch" @instruction,
    ImmAtomicCmpExch = 185 => "imm_atomic_cmp_exch" @instruction,
    ImmAtomicIMax = 186 => "imm_atomic_imax" @instruction,
    ImmAtomicIMin = 187 => "imm_atomic_imin" @instruction,
    ImmAtomicUMax = 188 => "imm_atomic_umax" @instruction,
    ImmAtomicUMin = 189 => "imm_atomic_umin" @instruction,
    Sync = 190 => "sync" @instruction,
    DAdd = 191 => "dadd" @instruction,
    DMax = 192 => "dmax" @instruction,
    DMin = 193 => "dmin" @instruction,
    DMul = 194 => "dmul" @instruction,
    DEq = 195 => "deq" @instruction,
    DGe = 196 => "dge" @instruction,
    DLt = 197 => "dlt" @instruction,
    DNe = 198 => "dne" @instruction,
    DMov = 199 => "dmov" @instruction,
    DMovc = 200 => "dmovc" @instruction,
    DtoF = 201 => "dtof" @instruction,
    FtoD = 202 => "ftod" @instruction,
    EvalSnapped = 203 => "eval_snapped" @instruction,
    EvalSampleIndex = 204 => "eval_sample_index" @instruction,
    EvalCentroid = 205 => "eval_centroid" @instruction,
    DclGsInstanceCount = 206 => "dcl_gsinstances" @declaration,
}

impl Opcode {
    pub const fn raw(self) -> u32 {
        self as u32
    }
}
