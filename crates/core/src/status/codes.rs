// Code domains folded into StatusCode

/// Ledger-engine transaction result codes.
///
/// Negative ranges are local/malformed/failure/retry classes, zero is success,
/// positive codes are claimed-fee results.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Ter {
    telLOCAL_ERROR = -399,
    telBAD_DOMAIN = -398,
    telBAD_PATH_COUNT = -397,
    telINSUF_FEE_P = -394,

    temMALFORMED = -299,
    temBAD_AMOUNT = -298,
    temBAD_AUTH_MASTER = -297,
    temBAD_CURRENCY = -296,
    temBAD_FEE = -295,
    temBAD_PATH = -290,

    tefFAILURE = -199,
    tefALREADY = -198,
    tefPAST_SEQ = -190,

    terRETRY = -99,
    terFUNDS_SPENT = -98,
    terNO_ACCOUNT = -96,
    terPRE_SEQ = -92,

    tesSUCCESS = 0,

    tecCLAIM = 100,
    tecPATH_PARTIAL = 101,
    tecUNFUNDED_OFFER = 103,
    tecNO_DST = 124,
}

impl Ter {
    pub const ALL: [Ter; 22] = [
        Ter::telLOCAL_ERROR,
        Ter::telBAD_DOMAIN,
        Ter::telBAD_PATH_COUNT,
        Ter::telINSUF_FEE_P,
        Ter::temMALFORMED,
        Ter::temBAD_AMOUNT,
        Ter::temBAD_AUTH_MASTER,
        Ter::temBAD_CURRENCY,
        Ter::temBAD_FEE,
        Ter::temBAD_PATH,
        Ter::tefFAILURE,
        Ter::tefALREADY,
        Ter::tefPAST_SEQ,
        Ter::terRETRY,
        Ter::terFUNDS_SPENT,
        Ter::terNO_ACCOUNT,
        Ter::terPRE_SEQ,
        Ter::tesSUCCESS,
        Ter::tecCLAIM,
        Ter::tecPATH_PARTIAL,
        Ter::tecUNFUNDED_OFFER,
        Ter::tecNO_DST,
    ];

    pub fn raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<Ter> {
        Self::ALL.iter().copied().find(|t| t.raw() == raw)
    }

    /// (token, human description)
    pub fn info(self) -> (&'static str, &'static str) {
        match self {
            Ter::telLOCAL_ERROR => ("telLOCAL_ERROR", "Local failure."),
            Ter::telBAD_DOMAIN => ("telBAD_DOMAIN", "Domain too long."),
            Ter::telBAD_PATH_COUNT => ("telBAD_PATH_COUNT", "Malformed: Too many paths."),
            Ter::telINSUF_FEE_P => ("telINSUF_FEE_P", "Fee insufficient."),
            Ter::temMALFORMED => ("temMALFORMED", "Malformed transaction."),
            Ter::temBAD_AMOUNT => ("temBAD_AMOUNT", "Can only send positive amounts."),
            Ter::temBAD_AUTH_MASTER => (
                "temBAD_AUTH_MASTER",
                "Auth for unclaimed account needs correct master key.",
            ),
            Ter::temBAD_CURRENCY => ("temBAD_CURRENCY", "Malformed: Bad currency."),
            Ter::temBAD_FEE => ("temBAD_FEE", "Invalid fee, negative or not XRP."),
            Ter::temBAD_PATH => ("temBAD_PATH", "Malformed: Bad path."),
            Ter::tefFAILURE => ("tefFAILURE", "Failed to apply."),
            Ter::tefALREADY => ("tefALREADY", "The exact transaction was already in this ledger."),
            Ter::tefPAST_SEQ => ("tefPAST_SEQ", "This sequence number has already past."),
            Ter::terRETRY => ("terRETRY", "Retry transaction."),
            Ter::terFUNDS_SPENT => (
                "terFUNDS_SPENT",
                "Can't set password, password set funds already spent.",
            ),
            Ter::terNO_ACCOUNT => ("terNO_ACCOUNT", "The source account does not exist."),
            Ter::terPRE_SEQ => ("terPRE_SEQ", "Missing/inapplicable prior transaction."),
            Ter::tesSUCCESS => ("tesSUCCESS", "The transaction was applied."),
            Ter::tecCLAIM => ("tecCLAIM", "Fee claimed. Sequence used. No action."),
            Ter::tecPATH_PARTIAL => ("tecPATH_PARTIAL", "Path could not send full amount."),
            Ter::tecUNFUNDED_OFFER => ("tecUNFUNDED_OFFER", "Insufficient balance to fund created offer."),
            Ter::tecNO_DST => ("tecNO_DST", "Destination does not exist. Send XRP to create it."),
        }
    }
}

/// RPC error codes reported by the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RpcErrorCode {
    Success = 0,
    BadSyntax = 1,
    JsonRpc = 2,
    Forbidden = 3,
    NoPermission = 6,
    TooBusy = 9,
    SlowDown = 10,
    NoClosed = 14,
    NoCurrent = 15,
    ActNotFound = 19,
    LgrNotFound = 21,
    LgrNotValidated = 22,
    InvalidParams = 31,
    UnknownCommand = 32,
    ActMalformed = 35,
    LgrIdxMalformed = 40,
    EntryNotFound = 42,
    HashMalformed = 45,
    Internal = 73,
}

impl RpcErrorCode {
    pub const ALL: [RpcErrorCode; 19] = [
        RpcErrorCode::Success,
        RpcErrorCode::BadSyntax,
        RpcErrorCode::JsonRpc,
        RpcErrorCode::Forbidden,
        RpcErrorCode::NoPermission,
        RpcErrorCode::TooBusy,
        RpcErrorCode::SlowDown,
        RpcErrorCode::NoClosed,
        RpcErrorCode::NoCurrent,
        RpcErrorCode::ActNotFound,
        RpcErrorCode::LgrNotFound,
        RpcErrorCode::LgrNotValidated,
        RpcErrorCode::InvalidParams,
        RpcErrorCode::UnknownCommand,
        RpcErrorCode::ActMalformed,
        RpcErrorCode::LgrIdxMalformed,
        RpcErrorCode::EntryNotFound,
        RpcErrorCode::HashMalformed,
        RpcErrorCode::Internal,
    ];

    pub fn raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<RpcErrorCode> {
        Self::ALL.iter().copied().find(|c| c.raw() == raw)
    }

    /// (token, human description)
    pub fn info(self) -> (&'static str, &'static str) {
        match self {
            RpcErrorCode::Success => ("success", "Success."),
            RpcErrorCode::BadSyntax => ("badSyntax", "Syntax error."),
            RpcErrorCode::JsonRpc => ("json_rpc", "JSON-RPC transport error."),
            RpcErrorCode::Forbidden => ("forbidden", "Bad credentials."),
            RpcErrorCode::NoPermission => ("noPermission", "You don't have permission for this command."),
            RpcErrorCode::TooBusy => ("tooBusy", "The server is too busy to help you now."),
            RpcErrorCode::SlowDown => ("slowDown", "You are placing too much load on the server."),
            RpcErrorCode::NoClosed => ("noClosed", "Closed ledger is unavailable."),
            RpcErrorCode::NoCurrent => ("noCurrent", "Current ledger is unavailable."),
            RpcErrorCode::ActNotFound => ("actNotFound", "Account not found."),
            RpcErrorCode::LgrNotFound => ("lgrNotFound", "Ledger not found."),
            RpcErrorCode::LgrNotValidated => ("lgrNotValidated", "Ledger not validated."),
            RpcErrorCode::InvalidParams => ("invalidParams", "Invalid parameters."),
            RpcErrorCode::UnknownCommand => ("unknownCmd", "Unknown method."),
            RpcErrorCode::ActMalformed => ("actMalformed", "Account malformed."),
            RpcErrorCode::LgrIdxMalformed => ("lgrIdxMalformed", "Ledger index malformed."),
            RpcErrorCode::EntryNotFound => ("entryNotFound", "Entry not found."),
            RpcErrorCode::HashMalformed => ("hashMalformed", "Hash is malformed."),
            RpcErrorCode::Internal => ("internal", "Internal error."),
        }
    }
}

/// Raw code used for generic exceptions.
pub const EXCEPTION_ERROR: i32 = -1;
