//! A one-tile routing graph shared by unit tests.
//!
//! Nodes: IPIN 0 (top) and 1 (right), CHANX 2 (inc) and 3 (dec), OPIN 4,
//! CHANY 5 (inc) and 6 (dec). IPIN 0 and CHANX 2 each have two configurable
//! drivers; IPIN 1 has one configurable and one `short` driver.

pub(crate) const RRG: &str = "\
(rr_graph
(switches
(switch
Aid 0
Aname mux0
Atype mux
)switch
(switch
Aid 1
Aname short
Atype short
)switch
)switches
(segments
(segment
Aid 0
Aname L1
)segment
)segments
(block_types
(block_type
Aid 0
Aname EMPTY
Awidth 1
Aheight 1
)block_type
(block_type
Aid 1
Aname clb
Awidth 1
Aheight 1
(pin_class
Atype INPUT
(pin
Aptc 0
-clb.I[0]
)pin
(pin
Aptc 1
-clb.I[1]
)pin
)pin_class
(pin_class
Atype OUTPUT
(pin
Aptc 2
-clb.O[0]
)pin
)pin_class
)block_type
)block_types
(grid
(grid_loc
Ax 0
Ay 0
Ablock_type_id 0
Awidth_offset 0
Aheight_offset 0
)grid_loc
(grid_loc
Ax 1
Ay 1
Ablock_type_id 1
Awidth_offset 0
Aheight_offset 0
)grid_loc
)grid
(rr_nodes
(node
Aid 0
Atype IPIN
(loc
Axlow 1
Aylow 1
Axhigh 1
Ayhigh 1
Aptc 0
Aside TOP
)loc
)node
(node
Aid 1
Atype IPIN
(loc
Axlow 1
Aylow 1
Axhigh 1
Ayhigh 1
Aptc 1
Aside RIGHT
)loc
)node
(node
Aid 2
Atype CHANX
Adirection INC_DIR
(loc
Axlow 1
Aylow 1
Axhigh 1
Ayhigh 1
Aptc 0
)loc
(segment
Asegment_id 0
)segment
)node
(node
Aid 3
Atype CHANX
Adirection DEC_DIR
(loc
Axlow 1
Aylow 1
Axhigh 1
Ayhigh 1
Aptc 1
)loc
(segment
Asegment_id 0
)segment
)node
(node
Aid 4
Atype OPIN
(loc
Axlow 1
Aylow 1
Axhigh 1
Ayhigh 1
Aptc 2
Aside TOP
)loc
)node
(node
Aid 5
Atype CHANY
Adirection INC_DIR
(loc
Axlow 1
Aylow 1
Axhigh 1
Ayhigh 1
Aptc 0
)loc
(segment
Asegment_id 0
)segment
)node
(node
Aid 6
Atype CHANY
Adirection DEC_DIR
(loc
Axlow 1
Aylow 1
Axhigh 1
Ayhigh 1
Aptc 1
)loc
(segment
Asegment_id 0
)segment
)node
)rr_nodes
(rr_edges
(edge
Asrc_node 2
Asink_node 0
Aswitch_id 0
)edge
(edge
Asrc_node 3
Asink_node 0
Aswitch_id 0
)edge
(edge
Asrc_node 5
Asink_node 1
Aswitch_id 0
)edge
(edge
Asrc_node 6
Asink_node 1
Aswitch_id 1
)edge
(edge
Asrc_node 4
Asink_node 2
Aswitch_id 0
)edge
(edge
Asrc_node 5
Asink_node 2
Aswitch_id 0
)edge
(edge
Asrc_node 4
Asink_node 3
Aswitch_id 0
)edge
)rr_edges
)rr_graph
";
