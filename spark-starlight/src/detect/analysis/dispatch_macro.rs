macro_rules! define_describer {
    ($($name: ident => $to: ident, )*) => {
        #[derive(Debug, Clone)]
        pub enum DescriberDispatcher {
            $(
                $name($to),
            )*
        }

        impl Describer for DescriberDispatcher {
            fn describe(&self, result: &FrameResult) -> Option<String> {
                match self {
                    $(
                        DescriberDispatcher::$name(describer) => describer.describe(result),
                    )*
                }
            }
        }

        impl DescriberDispatcher {
            pub fn all() -> Vec<Self> {
                vec![
                    $(
                        Self::$name($to::default()),
                    )*
                ]
            }
        }
    };
}
